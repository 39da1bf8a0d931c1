//! Custom macros for reducing code repetition in backdrop

/// Validate that a string value is one of the allowed variants
///
/// # Example
/// ```ignore
/// validate_enum!(strategy, "next-sibling", "matched")?;
/// ```
#[macro_export]
macro_rules! validate_enum {
    ($value:expr, $($variant:expr),+) => {
        match $value {
            $($variant)|+ => Ok::<(), anyhow::Error>(()),
            _ => anyhow::bail!("Invalid value: {} (expected one of: {})", $value, [$($variant),+].join(", ")),
        }
    };
}

/// Reject an empty window identity in config
///
/// # Example
/// ```ignore
/// require_identity!(self.shell.root_class, "shell.root_class");
/// ```
#[macro_export]
macro_rules! require_identity {
    ($value:expr, $key:expr) => {
        if $value.trim().is_empty() {
            anyhow::bail!("{} must not be empty", $key);
        }
    };
}
