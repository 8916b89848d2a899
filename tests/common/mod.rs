//! Shared fixture builders for the cascading-scan integration tests

use cascade::domain::{CascadingRule, Finding, FindingPredicate, Matches, Scan, ScanTemplate};

/// A network scan that has just completed.
pub fn nmap_scan(name: &str) -> Scan {
    Scan::new(name, "nmap").with_uid("3c9f71e2")
}

/// An open-port finding with `service`/`port`/`hostname` attributes.
pub fn port_finding(id: &str, port: u64, service: &str) -> Finding {
    Finding::new(id, format!("Open Port {port}/tcp"), "Open Port")
        .with_attribute("port", port)
        .with_attribute("service", service)
        .with_attribute("hostname", "demo.internal")
}

/// A rule triggering `scan_type` on findings with the given service.
pub fn service_rule(name: &str, service: &str, scan_type: &str) -> CascadingRule {
    CascadingRule::new(
        name,
        Matches::any_of([FindingPredicate::attribute("service", service)]),
        ScanTemplate {
            scan_type: scan_type.into(),
            parameters: vec!["-h".into(), "{{$.hostOrIP}}".into()],
            ..ScanTemplate::default()
        },
    )
}
