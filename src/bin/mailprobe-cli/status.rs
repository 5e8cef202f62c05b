use mailprobe_lib::{ConfigStatus, ConnectionReport};

pub fn render(status: &ConfigStatus, report: &ConnectionReport) -> String {
    let mut out = String::new();
    let backends = if status.backends.is_empty() {
        "none".to_string()
    } else {
        status
            .backends
            .iter()
            .map(|kind| kind.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };
    out.push_str(&format!("backends: {backends}\n"));
    out.push_str(&format!(
        "preferred: {}\n",
        status
            .preferred
            .map(|kind| kind.to_string())
            .unwrap_or_else(|| "none".to_string())
    ));
    out.push_str(&format!(
        "default from: {}\n",
        status.default_from.as_deref().unwrap_or("(not set)")
    ));

    for connection in &report.backends {
        let state = match (connection.configured, connection.connected) {
            (false, _) => "not configured".to_string(),
            (true, true) => format!("connected ({})", connection.detail.as_deref().unwrap_or("ok")),
            (true, false) => format!(
                "unreachable: {}",
                connection.error.as_deref().unwrap_or("unknown error")
            ),
        };
        out.push_str(&format!("{}: {state}\n", connection.backend));
    }
    out
}

#[cfg(feature = "with-serde")]
#[derive(serde::Serialize)]
pub struct StatusReport<'a> {
    pub config: &'a ConfigStatus,
    pub connections: &'a ConnectionReport,
}
