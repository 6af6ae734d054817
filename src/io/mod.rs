/*!
Exporting traces and histograms. Enable the `csv` feature for [`csv`] output.
*/

#[cfg(feature = "csv")]
pub mod csv;
