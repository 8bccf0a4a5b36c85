//! SQL template helpers
//!
//! Catalog queries are written as templates carrying literal markers
//! (`<<PERMISSIONS>>`, `<<DATASETS>>`, `<<PROBES>>`). The functions here are
//! the only code allowed to substitute them; ad-hoc string replacement of
//! markers elsewhere is a bug. Every value travels as a named bind, never
//! as spliced text.

use rusqlite::ToSql;

pub const PERMISSIONS_MARKER: &str = "<<PERMISSIONS>>";
pub const DATASETS_MARKER: &str = "<<DATASETS>>";
pub const PROBES_MARKER: &str = "<<PROBES>>";

/// Ordered list of named bind arguments for one statement.
#[derive(Default)]
pub struct SqlArgs {
    args: Vec<(String, Box<dyn ToSql>)>,
}

impl SqlArgs {
    pub fn new() -> SqlArgs {
        SqlArgs::default()
    }

    /// Add a bind under `name` (without the leading `:`).
    pub fn push(&mut self, name: &str, value: impl ToSql + 'static) {
        self.args.push((format!(":{name}"), Box::new(value)));
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Borrow the binds in the slice form rusqlite takes as named params.
    pub fn params(&self) -> Vec<(&str, &dyn ToSql)> {
        self.args
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_ref() as &dyn ToSql))
            .collect()
    }
}

/// Replace `<<PERMISSIONS>>` with a dataset access predicate.
///
/// Admins see everything (`1=1`). Everyone else is limited to datasets
/// carrying at least one of their permission tags, bound one named
/// parameter per tag; an empty tag list matches nothing (`1=0`). The
/// enclosing template must have a `datasets` table in scope.
pub fn permission_clause(
    sql: &str,
    is_admin: bool,
    permissions: &[String],
    args: &mut SqlArgs,
) -> String {
    let predicate = if is_admin {
        "1=1".to_string()
    } else if permissions.is_empty() {
        "1=0".to_string()
    } else {
        let mut names = Vec::with_capacity(permissions.len());

        for (i, permission) in permissions.iter().enumerate() {
            let name = format!("perm{}", i + 1);
            names.push(format!(":{name}"));
            args.push(&name, permission.clone());
        }

        format!(
            "datasets.id IN (SELECT dataset_permissions.dataset_id \
             FROM dataset_permissions \
             JOIN permissions ON permissions.id = dataset_permissions.permission_id \
             WHERE permissions.name IN ({}))",
            names.join(", ")
        )
    };

    sql.replace(PERMISSIONS_MARKER, &predicate)
}

/// Replace `marker` with one named bind per element of `values`.
///
/// The template supplies the `column IN (…)` scaffolding around the
/// marker. An empty list substitutes `NULL`, which `IN` never matches.
pub fn in_clause(
    sql: &str,
    marker: &str,
    prefix: &str,
    values: &[String],
    args: &mut SqlArgs,
) -> String {
    if values.is_empty() {
        return sql.replace(marker, "NULL");
    }

    let mut names = Vec::with_capacity(values.len());

    for (i, value) in values.iter().enumerate() {
        let name = format!("{}{}", prefix, i + 1);
        names.push(format!(":{name}"));
        args.push(&name, value.clone());
    }

    sql.replace(marker, &names.join(", "))
}
