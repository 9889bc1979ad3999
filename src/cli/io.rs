//! JSON I/O handling for CLI
//!
//! - Input: single JSON object via stdin
//! - Output: single JSON object via stdout
//! - UTF-8 only

use std::io::{self, Read, Write};

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Read a JSON request from stdin
pub fn read_request() -> CliResult<Value> {
    let mut input = String::new();
    io::stdin().lock().read_to_string(&mut input)?;
    parse_request(&input)
}

/// Parse one JSON request document
pub fn parse_request(input: &str) -> CliResult<Value> {
    if input.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }

    let value: Value = serde_json::from_str(input)?;
    Ok(value)
}

/// `{"status": "ok", "data": ...}`
pub fn ok_envelope(data: Value) -> Value {
    json!({
        "status": "ok",
        "data": data
    })
}

/// `{"status": "error", "code": ..., "message": ...}`
pub fn error_envelope(code: &str, message: &str) -> Value {
    json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

/// Write one JSON document and a newline to stdout
pub fn write_json(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request() {
        let value = parse_request("  {\"doctype\": \"Invoice\"}\n").unwrap();
        assert_eq!(value["doctype"], "Invoice");

        assert_eq!(
            parse_request("   ").unwrap_err().code_str(),
            "TABLEFETCH_CLI_IO_ERROR"
        );
        assert!(parse_request("{oops").is_err());
    }

    #[test]
    fn test_envelopes() {
        assert_eq!(
            ok_envelope(json!([])),
            json!({"status": "ok", "data": []})
        );
        assert_eq!(
            error_envelope("QUERY_INVALID_FIELD", "bad"),
            json!({"status": "error", "code": "QUERY_INVALID_FIELD", "message": "bad"})
        );
    }
}
