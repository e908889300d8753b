use std::collections::HashMap;

use crate::config::Options;
use crate::error::FlexError;
use crate::schema::{FieldDesc, RecordDesc};
use crate::value::Value;
use crate::visitor::Direction;

/// A source field and the target field it corresponds to.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPair {
    pub source: FieldDesc,
    pub target: FieldDesc,
}

/// Matches the fields of `source` against `target`, in source declaration
/// order.
///
/// Ignored and `skip` fields never match. A source field without a
/// counterpart is dropped, or fails with [`FlexError::OrphanField`] in strict
/// mode.
pub fn pairs(
    source: &RecordDesc,
    target: &RecordDesc,
    direction: Direction,
    options: &Options,
) -> Result<Vec<FieldPair>, FlexError> {
    let targets = target.fields();
    let mut out = Vec::new();

    for field in source.fields() {
        if field.options.skip || options.is_ignored(field.name) {
            tracing::trace!(field = field.name, "skipping ignored source field");
            continue;
        }

        match find_target(&targets, field.name, direction, options) {
            Some(to) => {
                tracing::trace!(
                    source_field = field.name,
                    target_field = to.name,
                    "matched fields"
                );
                out.push(FieldPair {
                    source: field,
                    target: to.clone(),
                });
            }
            None if options.strict => {
                return Err(FlexError::OrphanField(field.name.to_string()));
            }
            None => {
                tracing::debug!(
                    field = field.name,
                    source_type = source.name,
                    target_type = target.name,
                    "no corresponding field"
                );
            }
        }
    }

    Ok(out)
}

fn find_target<'a>(
    targets: &'a [FieldDesc],
    name: &str,
    direction: Direction,
    options: &Options,
) -> Option<&'a FieldDesc> {
    let lookup = |wanted: &str| {
        targets
            .iter()
            .filter(|f| !f.options.skip && !options.is_ignored(f.name))
            .find(|f| f.name == wanted)
    };

    lookup(name).or_else(|| {
        let prefix = options.field_name_prefix.as_deref()?;
        match direction {
            Direction::Expand => lookup(&format!("{prefix}{name}")),
            Direction::Flatten => lookup(name.strip_prefix(prefix)?),
        }
    })
}

/// Feeds every matched pair, with the source field's value, to `f`.
///
/// Stops at the first error, which is returned located at the source field.
pub fn walk<F>(
    fields: Vec<(&'static str, Value)>,
    source: &RecordDesc,
    target: &RecordDesc,
    direction: Direction,
    options: &Options,
    mut f: F,
) -> Result<(), FlexError>
where
    F: FnMut(&FieldPair, Value) -> Result<(), FlexError>,
{
    let mut values: HashMap<&str, Value> = fields.into_iter().collect();

    for pair in pairs(source, target, direction, options)? {
        let name = pair.source.name;
        let Some(value) = values.remove(name) else {
            continue;
        };
        f(&pair, value).map_err(|e| {
            tracing::debug!(field = name, record = source.name, error = %e, "field failed");
            e.in_field(name)
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldOptions, TypeDesc};

    fn source_fields() -> Vec<FieldDesc> {
        vec![
            FieldDesc::new("name", TypeDesc::String),
            FieldDesc::new("size", TypeDesc::Int(crate::schema::IntWidth::I32)),
            FieldDesc::new("tags", TypeDesc::String),
            FieldDesc::new("hidden", TypeDesc::Bool).with_options(FieldOptions {
                skip: true,
                ..FieldOptions::default()
            }),
            FieldDesc::new("extra", TypeDesc::Bool),
        ]
    }

    fn target_fields() -> Vec<FieldDesc> {
        vec![
            FieldDesc::new("size", TypeDesc::Int(crate::schema::IntWidth::I64)),
            FieldDesc::new("name", TypeDesc::String),
            FieldDesc::new("tags", TypeDesc::String),
            FieldDesc::new("hidden", TypeDesc::Bool),
            FieldDesc::new("cluster_extra", TypeDesc::Bool),
        ]
    }

    fn names(pairs: &[FieldPair]) -> Vec<(&str, &str)> {
        pairs.iter().map(|p| (p.source.name, p.target.name)).collect()
    }

    #[test]
    fn pairs_follow_source_order_and_skip_orphans() {
        let source = RecordDesc::new("Source", source_fields);
        let target = RecordDesc::new("Target", target_fields);
        let pairs = pairs(&source, &target, Direction::Expand, &Options::default()).unwrap();
        assert_eq!(names(&pairs), vec![("name", "name"), ("size", "size")]);
    }

    #[test]
    fn strict_mode_reports_orphans() {
        let source = RecordDesc::new("Source", source_fields);
        let target = RecordDesc::new("Target", target_fields);
        let err = pairs(&source, &target, Direction::Expand, &Options::default().strict(true))
            .unwrap_err();
        assert_eq!(err, FlexError::OrphanField("extra".into()));
    }

    #[test]
    fn prefix_is_added_on_expand_and_stripped_on_flatten() {
        let source = RecordDesc::new("Source", source_fields);
        let target = RecordDesc::new("Target", target_fields);
        let options = Options::default().with_field_name_prefix("cluster_");
        let expanded = pairs(&source, &target, Direction::Expand, &options).unwrap();
        assert!(names(&expanded).contains(&("extra", "cluster_extra")));

        let flattened = pairs(&target, &source, Direction::Flatten, &options).unwrap();
        assert!(names(&flattened).contains(&("cluster_extra", "extra")));
    }

    #[test]
    fn walk_stops_at_first_error_and_names_the_field() {
        let source = RecordDesc::new("Source", source_fields);
        let target = RecordDesc::new("Target", target_fields);
        let values = vec![
            ("name", Value::String("a".into())),
            ("size", Value::Int(1)),
        ];
        let mut seen = Vec::new();
        let err = walk(values, &source, &target, Direction::Expand, &Options::default(), |pair, _| {
            seen.push(pair.source.name);
            Err(FlexError::shape("boom"))
        })
        .unwrap_err();
        assert_eq!(seen, vec!["name"]);
        assert_eq!(err.to_string(), "name: shape error: boom");
    }
}
