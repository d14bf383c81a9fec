use serde_json::Value;

/// Flatten a Jupyter notebook into a plain script: code cells verbatim,
/// markdown cells as `# ` comments, each under an `# In[i]` marker. Input
/// that is not a notebook is returned unchanged.
pub fn flatten_notebook(json_text: &str) -> String {
    let notebook: Value = match serde_json::from_str(json_text) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("notebook is not valid JSON, keeping raw text: {}", e);
            return json_text.to_string();
        }
    };

    let Some(cells) = notebook.get("cells").and_then(Value::as_array) else {
        tracing::warn!("notebook has no cells array, keeping raw text");
        return json_text.to_string();
    };

    let mut out: Vec<String> = Vec::new();
    for (i, cell) in cells.iter().enumerate() {
        let source = cell_source(cell);
        match cell.get("cell_type").and_then(Value::as_str) {
            Some("code") => {
                out.push(format!("# In[{}]:", i));
                out.push(source.trim_end_matches('\n').to_string());
                out.push(String::new());
            }
            Some("markdown") => {
                out.push(format!("# In[{}] (markdown):", i));
                for line in source.trim_end_matches('\n').lines() {
                    out.push(format!("# {}", line));
                }
                out.push(String::new());
            }
            _ => {}
        }
    }

    out.join("\n")
}

fn cell_source(cell: &Value) -> String {
    match cell.get("source") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(parts)) => parts.iter().filter_map(Value::as_str).collect(),
        _ => String::new(),
    }
}
