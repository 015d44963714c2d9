use aegis_gate::Config;
use aegis_gate::governance::Session;

pub fn render_status(config: &Config, governor_version: &str) -> String {
    let lines = [
        format!("◆ aegis-gate {}", env!("CARGO_PKG_VERSION")),
        String::new(),
        format!("  config      {}", config.config_path.display()),
        format!(
            "  endpoint    {}",
            config.provider.endpoint.as_deref().unwrap_or("(unset)")
        ),
        format!("  model       {}", config.provider.model),
        format!("  governor    {governor_version}"),
        format!("  strictness  {}", config.governor.strictness),
        format!(
            "  limits      {}/hour, {}/minute",
            config.rate_limit.hourly, config.rate_limit.burst
        ),
        format!(
            "  audit log   {}",
            config.audit.resolved_log_path().display()
        ),
    ];
    lines.join("\n")
}

/// One-line session summary printed after each turn.
pub fn render_session_line(session: &Session) -> String {
    format!(
        "caller={} turns={} risk={:.2}",
        session.caller_id,
        session.context.len() / 2,
        session.context.cumulative_risk_score()
    )
}
