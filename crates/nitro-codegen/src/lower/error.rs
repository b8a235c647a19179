use std::fmt;

/// The compiler stage that raised an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Parse,
    Sql,
    Classify,
    Decompose,
    Codegen,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Pass::Parse => "parse",
            Pass::Sql => "sql",
            Pass::Classify => "classify",
            Pass::Decompose => "decompose",
            Pass::Codegen => "codegen",
        };
        f.write_str(name)
    }
}

/// Failure after a successful parse.
///
/// `Internal` marks a tree shape a pass cannot handle, such as a markup
/// capture of something other than a name or a select that survived SQL
/// lowering. `Unsupported` marks valid input this compiler rejects.
#[derive(Debug, Clone, PartialEq)]
pub enum LowerError {
    Internal {
        pass: Pass,
        node: String,
        detail: String,
    },
    Unsupported {
        pass: Pass,
        feature: String,
    },
}

impl LowerError {
    pub fn internal(pass: Pass, node: impl Into<String>, detail: impl Into<String>) -> Self {
        LowerError::Internal {
            pass,
            node: node.into(),
            detail: detail.into(),
        }
    }

    pub fn unsupported(pass: Pass, feature: impl Into<String>) -> Self {
        LowerError::Unsupported {
            pass,
            feature: feature.into(),
        }
    }

    pub fn pass(&self) -> Pass {
        match self {
            LowerError::Internal { pass, .. } | LowerError::Unsupported { pass, .. } => *pass,
        }
    }
}

impl fmt::Display for LowerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LowerError::Internal { pass, node, detail } => {
                write!(f, "internal error in {pass} pass at {node}: {detail}")
            }
            LowerError::Unsupported { pass, feature } => {
                write!(f, "unsupported in {pass} pass: {feature}")
            }
        }
    }
}

impl std::error::Error for LowerError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_message_names_pass_and_node() {
        let err = LowerError::internal(Pass::Classify, "call", "markup captures must be names");
        assert_eq!(
            err.to_string(),
            "internal error in classify pass at call: markup captures must be names"
        );
        assert_eq!(err.pass(), Pass::Classify);
    }

    #[test]
    fn unsupported_message() {
        let err = LowerError::unsupported(Pass::Sql, "duplicate result column `name`");
        assert_eq!(
            err.to_string(),
            "unsupported in sql pass: duplicate result column `name`"
        );
    }
}
