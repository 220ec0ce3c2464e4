pub fn parse_session(s: &str) -> Result<u32, String> {
    let session = s
        .parse::<u32>()
        .map_err(|e| format!("invalid session number: {e}"))?;
    if crate::consts::SESSIONS.iter().any(|b| b.session == session) {
        Ok(session)
    } else {
        Err(format!("unknown session {}", session))
    }
}

pub fn parse_export_kind(s: &str) -> Result<ExportKind, String> {
    match s.to_lowercase().as_str() {
        "votes" => Ok(ExportKind::Votes),
        "voters" => Ok(ExportKind::Voters),
        "governors" => Ok(ExportKind::Governors),
        _ => Err(format!("invalid export kind: {}", s)),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportKind {
    Votes,
    Voters,
    Governors,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session() {
        assert_eq!(parse_session("1"), Ok(1));
        assert_eq!(parse_session("3"), Ok(3));
        assert!(parse_session("0").is_err());
        assert!(parse_session("three").is_err());
    }

    #[test]
    fn test_parse_export_kind() {
        assert_eq!(parse_export_kind("votes"), Ok(ExportKind::Votes));
        assert_eq!(parse_export_kind("Voters"), Ok(ExportKind::Voters));
        assert_eq!(parse_export_kind("GOVERNORS"), Ok(ExportKind::Governors));
        assert!(parse_export_kind("ballots").is_err());
    }
}
