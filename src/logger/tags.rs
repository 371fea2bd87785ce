/// Subsystem tags attached to every log event

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub enum LogTag {
    System,
    Api,
    Receipts,
    Holders,
    Transfers,
    Activity,
    Reconcile,
    Report,
    Config,
}

impl LogTag {
    /// Uppercase label without color codes, used for file and memory sinks
    pub fn to_plain_string(&self) -> String {
        match self {
            LogTag::System => "SYSTEM".to_string(),
            LogTag::Api => "API".to_string(),
            LogTag::Receipts => "RECEIPTS".to_string(),
            LogTag::Holders => "HOLDERS".to_string(),
            LogTag::Transfers => "TRANSFERS".to_string(),
            LogTag::Activity => "ACTIVITY".to_string(),
            LogTag::Reconcile => "RECONCILE".to_string(),
            LogTag::Report => "REPORT".to_string(),
            LogTag::Config => "CONFIG".to_string(),
        }
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_plain_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_labels() {
        assert_eq!(LogTag::Receipts.to_plain_string(), "RECEIPTS");
        assert_eq!(LogTag::Reconcile.to_string(), "RECONCILE");
    }
}
