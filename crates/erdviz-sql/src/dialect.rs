//! SQL dialect hints and detection

/// SQL dialect family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SqlDialect {
    /// Detect from the DDL text
    #[default]
    Auto,

    /// MySQL / MariaDB
    MySql,

    /// PostgreSQL
    Postgres,

    /// Standard SQL
    Generic,
}

impl SqlDialect {
    /// Parse a dialect hint; unknown hints fall back to `Auto`
    pub fn from_hint(hint: &str) -> Self {
        Self::parse(hint).unwrap_or(Self::Auto)
    }

    /// Parse a dialect name
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "auto" => Some(Self::Auto),
            "mysql" | "mariadb" => Some(Self::MySql),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            "generic" | "ansi" => Some(Self::Generic),
            _ => None,
        }
    }

    /// Tag stored on the parsed model
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::MySql => "mysql",
            Self::Postgres => "postgres",
            Self::Generic => "generic",
        }
    }

    /// Detect dialect from SQL content
    pub fn detect(content: &str) -> Self {
        let lower = content.to_lowercase();

        // Dump headers
        if lower.contains("postgresql database dump") || lower.contains("pg_dump") {
            return Self::Postgres;
        }
        if lower.contains("mysql dump") || lower.contains("mysqldump") || lower.contains("mariadb dump") {
            return Self::MySql;
        }

        // Type keywords and quoting
        if lower.contains("auto_increment")
            || lower.contains("engine=")
            || lower.contains("engine =")
            || lower.contains("unsigned")
            || lower.contains('`')
        {
            return Self::MySql;
        }
        if lower.contains("serial")
            || lower.contains("::")
            || lower.contains("timestamptz")
            || lower.contains("jsonb")
            || lower.contains("bytea")
        {
            return Self::Postgres;
        }

        Self::Generic
    }

    /// Resolve `Auto` to a concrete dialect
    pub fn resolve(self, content: &str) -> Self {
        match self {
            Self::Auto => Self::detect(content),
            other => other,
        }
    }
}

impl std::fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hints() {
        assert_eq!(SqlDialect::from_hint("MySQL"), SqlDialect::MySql);
        assert_eq!(SqlDialect::from_hint("postgresql"), SqlDialect::Postgres);
        assert_eq!(SqlDialect::from_hint("auto"), SqlDialect::Auto);
        assert_eq!(SqlDialect::from_hint("oracle"), SqlDialect::Auto);
        assert_eq!(SqlDialect::parse("oracle"), None);
    }

    #[test]
    fn detect_postgres() {
        let sql = "-- PostgreSQL database dump\nCREATE TABLE users (id SERIAL);";
        assert_eq!(SqlDialect::detect(sql), SqlDialect::Postgres);
        assert_eq!(SqlDialect::detect("CREATE TABLE t (data JSONB);"), SqlDialect::Postgres);
    }

    #[test]
    fn detect_mysql() {
        let sql = "CREATE TABLE `users` (id INT AUTO_INCREMENT) ENGINE=InnoDB;";
        assert_eq!(SqlDialect::detect(sql), SqlDialect::MySql);
    }

    #[test]
    fn detect_generic() {
        let sql = "CREATE TABLE users (id INTEGER PRIMARY KEY);";
        assert_eq!(SqlDialect::detect(sql), SqlDialect::Generic);
    }

    #[test]
    fn resolve_keeps_explicit_dialect() {
        let sql = "CREATE TABLE t (id SERIAL);";
        assert_eq!(SqlDialect::MySql.resolve(sql), SqlDialect::MySql);
        assert_eq!(SqlDialect::Auto.resolve(sql), SqlDialect::Postgres);
    }
}
