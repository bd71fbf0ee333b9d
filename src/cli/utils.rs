use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::form::FormError;
use crate::notify::Notice;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(object)) = (data, response.as_object_mut()) {
                object.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Output a notice, with extra JSON fields for machine readers
pub fn output_notice(output_format: &OutputFormat, notice: &Notice, data: Option<Value>) -> anyhow::Result<()> {
    if notice.is_success() {
        output_success(output_format, &notice.message, data)
    } else {
        let code = data
            .as_ref()
            .and_then(|d| d.get("error_code"))
            .and_then(Value::as_str)
            .map(str::to_string);
        output_error(output_format, &notice.message, code.as_deref())
    }
}

/// Output per-field validation messages
pub fn output_form_errors(output_format: &OutputFormat, err: &FormError) -> anyhow::Result<()> {
    match (output_format, err) {
        (OutputFormat::Json, FormError::Invalid(errors)) => {
            println!("{}", serde_json::to_string_pretty(&json!({
                "success": false,
                "error": "Validation failed",
                "error_code": "VALIDATION_ERROR",
                "fields": errors
            }))?);
        }
        (OutputFormat::Text, FormError::Invalid(errors)) => {
            for (field, message) in errors {
                eprintln!("  {}: {}", field, message);
            }
        }
        (_, other) => output_error(output_format, &other.to_string(), Some("FORM_ERROR"))?,
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: []
            }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Left-aligned plain-text table
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(headers)];
    out.push(widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  "));
    out.extend(rows.iter().map(|r| line(r)));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_pads_to_widest_cell() {
        let headers = vec!["Name".to_string(), "Amount".to_string()];
        let rows = vec![
            vec!["Gold".to_string(), "120".to_string()],
            vec!["Platinum".to_string(), "5".to_string()],
        ];
        let table = render_table(&headers, &rows);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines[0], "Name      Amount");
        assert_eq!(lines[1], "--------  ------");
        assert_eq!(lines[3], "Platinum  5");
    }
}
