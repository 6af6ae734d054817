/*!
# CSV Output for Traces and Histograms

Writes chain samples or histogram bins to CSV files. Enable via the `csv` feature.
*/

use ndarray::{Array2, Axis};
use std::fmt::Display;
use std::fs::File;
use std::path::Path;

use csv::Writer;
use thiserror::Error;

use crate::stats::Histogram;

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("could not create output file")]
    Io(#[from] std::io::Error),
    #[error("could not write CSV record")]
    Csv(#[from] csv::Error),
}

/**
Saves a trace of scalar samples as a CSV file with the columns `sample,value`.

# Examples

```rust
use simpling::io::csv::save_csv;

let samples = [0.5, -0.25, 1.0];
let file = std::env::temp_dir().join("simpling_doc_trace.csv");
save_csv(&samples, &file).expect("Expecting saving data to succeed");
```
*/
pub fn save_csv<T: Display>(samples: &[T], filename: impl AsRef<Path>) -> Result<(), CsvError> {
    let mut wtr = Writer::from_writer(File::create(filename)?);
    wtr.write_record(["sample", "value"])?;
    for (i, x) in samples.iter().enumerate() {
        wtr.write_record([i.to_string(), x.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/**
Saves multi-dimensional samples, one row per sample (`sample × dimension`).

The header is `sample` followed by `dim_0`, `dim_1`, ...
*/
pub fn save_csv_rows<T: Display>(
    data: &Array2<T>,
    filename: impl AsRef<Path>,
) -> Result<(), CsvError> {
    let mut wtr = Writer::from_writer(File::create(filename)?);
    let n_dims = data.shape()[1];

    let mut header: Vec<String> = vec!["sample".to_string()];
    header.extend((0..n_dims).map(|i| format!("dim_{}", i)));
    wtr.write_record(&header)?;

    for (sample_idx, sample) in data.axis_iter(Axis(0)).enumerate() {
        let mut row = vec![sample_idx.to_string()];
        row.extend(sample.iter().map(|v| v.to_string()));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Saves a histogram as `bin_center,count,density` rows.
pub fn save_histogram_csv(hist: &Histogram, filename: impl AsRef<Path>) -> Result<(), CsvError> {
    let mut wtr = Writer::from_writer(File::create(filename)?);
    wtr.write_record(["bin_center", "count", "density"])?;
    let densities = hist.densities();
    for ((center, count), density) in hist
        .bin_centers()
        .iter()
        .zip(hist.counts().iter())
        .zip(densities.iter())
    {
        wtr.write_record([center.to_string(), count.to_string(), density.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use csv::Reader;
    use ndarray::arr2;
    use std::fs;
    use tempfile::NamedTempFile;

    #[test]
    fn test_save_csv_empty_trace() {
        let file = NamedTempFile::new().expect("Could not create temp file");
        save_csv::<f64>(&[], file.path()).unwrap();
        let contents = fs::read_to_string(file.path()).unwrap();
        assert_eq!(contents.trim(), "sample,value");
    }

    #[test]
    fn test_save_csv_trace() {
        let file = NamedTempFile::new().expect("Could not create temp file");
        save_csv(&[1.5, -0.5], file.path()).unwrap();
        let contents = fs::read_to_string(file.path()).unwrap();
        assert_eq!(contents.trim(), "sample,value\n0,1.5\n1,-0.5");
    }

    #[test]
    fn test_save_csv_rows() {
        let data = arr2(&[[1, 2], [3, 4]]);
        let file = NamedTempFile::new().expect("Could not create temp file");
        save_csv_rows(&data, file.path()).unwrap();
        let contents = fs::read_to_string(file.path()).unwrap();
        let expected = "\
sample,dim_0,dim_1
0,1,2
1,3,4";
        assert_eq!(contents.trim(), expected);
    }

    #[test]
    fn test_save_histogram_csv() -> Result<(), Box<dyn std::error::Error>> {
        let mut hist = Histogram::new(0.0, 2.0, 2)?;
        hist.extend([0.5, 1.5, 1.5, 1.0]);
        let file = NamedTempFile::new()?;
        save_histogram_csv(&hist, file.path())?;

        let mut rdr = Reader::from_path(file.path())?;
        let headers: Vec<&str> = rdr.headers()?.iter().collect();
        assert_eq!(headers, vec!["bin_center", "count", "density"]);
        let records: Vec<_> = rdr.records().collect::<Result<_, _>>()?;
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][1], "1");
        assert_eq!(&records[1][1], "3");
        assert_eq!(records[1][2].parse::<f64>()?, 0.75);
        Ok(())
    }
}
