// src/crawl/sniff.rs
// =============================================================================
// Guesses the candidate file types of a remote file without downloading it.
//
// Two signals are available from a HEAD response:
// - the extension of the file name
// - the Content-Type header
//
// Each contributes one FileType. When they disagree the file simply carries
// both, e.g. an overview "x.ovr" served as image/tiff sniffs as
// [ovr, tiff]; the flattener knows how to deal with that.
// =============================================================================

use crate::formats::normalize_ext;
use crate::tree::FileType;

/// Candidate types for a file, extension first, without duplicates.
pub fn sniff_file_types(file_name: &str, content_type: Option<&str>) -> Vec<FileType> {
    let mut types: Vec<FileType> = Vec::new();

    let candidates = [
        ext_from_name(file_name),
        content_type.and_then(ext_from_content_type).map(str::to_string),
    ];

    for ext in candidates.into_iter().flatten() {
        if !types.iter().any(|t| t.ext == ext) {
            types.push(FileType::new(ext));
        }
    }

    types
}

fn ext_from_name(file_name: &str) -> Option<String> {
    let index = file_name.rfind('.').filter(|&i| i > 0)?;
    // normalize_ext also folds "tif" onto "tiff" and "jpeg" onto "jpg".
    let ext = normalize_ext(&file_name[index + 1..]);
    (!ext.is_empty()).then_some(ext)
}

fn ext_from_content_type(content_type: &str) -> Option<&'static str> {
    let mime = content_type.split(';').next()?.trim().to_lowercase();

    let ext = match mime.as_str() {
        "image/tiff" | "image/geotiff" => "tiff",
        "image/jp2" | "image/jpx" => "jp2",
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "application/zip" | "application/x-zip-compressed" => "zip",
        "application/pdf" => "pdf",
        "application/json" => "json",
        "application/geo+json" | "application/vnd.geo+json" => "geojson",
        "application/vnd.google-earth.kml+xml" => "kml",
        "application/xml" | "text/xml" => "xml",
        "text/csv" => "csv",
        "text/html" => "html",
        "application/vnd.ms-excel" => "xls",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => "xlsx",
        "application/msword" => "doc",
        "application/x-dbf" | "application/dbf" => "dbf",
        _ => return None,
    };

    Some(ext)
}

/// The file name announced by a Content-Disposition header, if any.
///
/// Handles both `filename="a.shp"` and the RFC 5987 `filename*=UTF-8''a.shp`
/// form; the latter wins when both are present.
pub fn file_name_from_disposition(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for part in header.split(';').map(str::trim) {
        if let Some(value) = part.strip_prefix("filename*=") {
            // charset'language'value
            extended = value.rsplit("''").next().map(str::to_string);
        } else if let Some(value) = part.strip_prefix("filename=") {
            plain = Some(value.trim_matches('"').to_string());
        }
    }

    extended.or(plain).filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exts(types: &[FileType]) -> Vec<&str> {
        types.iter().map(|t| t.ext.as_str()).collect()
    }

    #[test]
    fn test_extension_only() {
        assert_eq!(exts(&sniff_file_types("roads.SHP", None)), vec!["shp"]);
    }

    #[test]
    fn test_tif_alias() {
        assert_eq!(exts(&sniff_file_types("dem.tif", Some("image/tiff"))), vec!["tiff"]);
    }

    #[test]
    fn test_overview_served_as_tiff_is_ambiguous() {
        assert_eq!(
            exts(&sniff_file_types("dem.ovr", Some("image/tiff; charset=binary"))),
            vec!["ovr", "tiff"]
        );
    }

    #[test]
    fn test_unknown_content_type_is_ignored() {
        assert_eq!(
            exts(&sniff_file_types("notes.txt", Some("application/octet-stream"))),
            vec!["txt"]
        );
    }

    #[test]
    fn test_no_extension_no_type() {
        assert!(sniff_file_types("README", None).is_empty());
        assert!(sniff_file_types(".hidden", None).is_empty());
    }

    #[test]
    fn test_disposition_file_name() {
        assert_eq!(
            file_name_from_disposition(r#"attachment; filename="roads.zip""#),
            Some("roads.zip".to_string())
        );
        assert_eq!(
            file_name_from_disposition("attachment; filename=a.zip; filename*=UTF-8''b.zip"),
            Some("b.zip".to_string())
        );
        assert_eq!(file_name_from_disposition("inline"), None);
    }
}
