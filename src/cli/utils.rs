use serde_json::{json, Value};
use crate::cli::OutputFormat;

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

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Render one drink as a single text line: `#1 water: blue x1 (water)`
pub fn drink_line(drink: &Value) -> String {
    let ingredients: Vec<String> = drink["recipe"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|i| {
                    let color = i["color"].as_str().unwrap_or("?");
                    let parts = i["parts"].as_u64().unwrap_or(0);
                    match i["name"].as_str() {
                        Some(name) => format!("{} x{} ({})", color, parts, name),
                        None => format!("{} x{}", color, parts),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    format!(
        "#{} {}: {}",
        drink["id"],
        drink["title"].as_str().unwrap_or(""),
        ingredients.join(", ")
    )
}
