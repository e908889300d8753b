use crate::config::Options;
use crate::error::FlexError;
use crate::flex::Flex;
use crate::registry::{CoercionRule, Context, Registry};
use crate::schema::{RecordDesc, TypeDesc};
use crate::value::Value;
use crate::visitor::{ExpandVisitor, FlattenVisitor, Visitor};
use crate::walker;

/// Configured transcoder: options plus the coercion registry.
///
/// Holds no per-call state; one instance may serve any number of threads.
#[derive(Default)]
pub struct Flexer {
    options: Options,
    registry: Registry,
}

impl Flexer {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            registry: Registry::builtin(),
        }
    }

    /// Adds a coercion rule ahead of the built-in ones.
    pub fn with_rule(mut self, rule: impl CoercionRule + 'static) -> Self {
        self.registry.register(rule);
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Copies a config-model record into an API-model record.
    pub fn expand<S: Flex, T: Flex>(&self, source: &S, target: &mut T) -> Result<(), FlexError> {
        self.transcode(&ExpandVisitor, source, target)
    }

    /// Copies an API-model record into a config-model record.
    pub fn flatten<S: Flex, T: Flex>(&self, source: &S, target: &mut T) -> Result<(), FlexError> {
        self.transcode(&FlattenVisitor, source, target)
    }

    /// Shape checks, then one walk over the source fields. Each field is
    /// written as soon as it is converted; a failure leaves earlier fields
    /// written.
    pub fn transcode<S: Flex, T: Flex>(
        &self,
        visitor: &dyn Visitor,
        source: &S,
        target: &mut T,
    ) -> Result<(), FlexError> {
        let direction = visitor.direction();
        let source_desc = source_record(S::describe())?;
        let target_desc = target_record(T::describe())?;
        let fields = match source.to_value() {
            Value::Record(fields) => fields,
            Value::Null => {
                return Err(FlexError::shape(format!(
                    "source {} is None",
                    source_desc.name
                )))
            }
            other => {
                return Err(FlexError::shape(format!(
                    "source {} read as {}",
                    source_desc.name,
                    other.kind()
                )))
            }
        };

        tracing::debug!(
            %direction,
            source_type = source_desc.name,
            target_type = target_desc.name,
            "transcoding"
        );

        let cx = Context::new(&self.registry, &self.options, visitor);
        walker::walk(
            fields,
            &source_desc,
            &target_desc,
            direction,
            &self.options,
            |pair, value| {
                if let Some(value) = visitor.visit(&cx, pair, value)? {
                    target.store_field(pair.target.name, value)?;
                }
                Ok(())
            },
        )
    }
}

/// A record, or an `Option` of one.
fn source_record(desc: TypeDesc) -> Result<RecordDesc, FlexError> {
    let desc = match desc {
        TypeDesc::Optional(inner) => *inner,
        other => other,
    };
    match desc {
        TypeDesc::Record(record) => Ok(record),
        other => Err(FlexError::shape(format!(
            "source must be a record, got {other}"
        ))),
    }
}

fn target_record(desc: TypeDesc) -> Result<RecordDesc, FlexError> {
    match desc {
        TypeDesc::Record(record) => Ok(record),
        other => Err(FlexError::shape(format!(
            "target must be a record, got {other}"
        ))),
    }
}

/// [`Flexer::expand`] with default options.
pub fn expand<S: Flex, T: Flex>(source: &S, target: &mut T) -> Result<(), FlexError> {
    Flexer::default().expand(source, target)
}

/// [`Flexer::flatten`] with default options.
pub fn flatten<S: Flex, T: Flex>(source: &S, target: &mut T) -> Result<(), FlexError> {
    Flexer::default().flatten(source, target)
}
