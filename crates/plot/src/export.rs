//! Point list export
//!
//! Delimited text goes through the `csv` writer, structured export
//! through `serde_json`.

use crate::error::{PlotError, PlotResult};
use crate::model::DataPoint;

/// Write points as delimited text with an `x,y` header.
///
/// Invalid points keep their x and leave y empty.
pub fn export_delimited(points: &[DataPoint], delimiter: u8) -> PlotResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    writer.write_record(["x", "y"])?;
    for point in points {
        let y = if point.valid {
            point.y.to_string()
        } else {
            String::new()
        };
        writer.write_record([point.x.to_string(), y])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| PlotError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| PlotError::Export(e.to_string()))
}

/// Write points as a pretty-printed JSON array; gaps serialize y as null
pub fn export_json(points: &[DataPoint]) -> PlotResult<String> {
    Ok(serde_json::to_string_pretty(points)?)
}
