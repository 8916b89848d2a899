//! Fixed annotation keys and API identifiers
//!
//! These strings are part of the compatibility surface: external tooling
//! reconstructs scan ancestry from them. Changing any of them breaks every
//! consumer that inspects produced manifests.

/// API version stamped on every synthesized scan.
pub const SCAN_API_VERSION: &str = "execution.cascade.dev/v1";

/// Resource kind of a scan.
pub const SCAN_KIND: &str = "Scan";

/// API version of cascading-rule resources.
pub const RULE_API_VERSION: &str = "cascading.cascade.dev/v1";

/// Resource kind of a cascading rule.
pub const RULE_KIND: &str = "CascadingRule";

/// Marks which hook produced a scan.
pub const HOOK_ANNOTATION: &str = "cascade.dev/hook";

/// Value of [`HOOK_ANNOTATION`] for scans produced by this engine.
pub const HOOK_NAME: &str = "cascading-scans";

/// Name of the parent scan a cascaded scan was derived from.
pub const PARENT_SCAN_ANNOTATION: &str = "cascading.cascade.dev/parent-scan";

/// Id of the finding that matched the cascading rule.
pub const MATCHED_FINDING_ANNOTATION: &str = "cascading.cascade.dev/matched-finding";

/// Ordered list of rule names applied along the scan's ancestry.
pub const CHAIN_ANNOTATION: &str = "cascading.cascade.dev/chain";

/// Delimiter between rule names in [`CHAIN_ANNOTATION`].
pub const CHAIN_DELIMITER: char = ',';
