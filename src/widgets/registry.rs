//! Indicator variant registry.
//!
//! Resolves the configured `progress_indicator` name to a registered
//! factory and constructs the variant eagerly, preferring the themed
//! constructor over the plain one. Every failure once a name was given is
//! a fatal configuration error raised here, never deferred to draw time.
//!
//! Name resolution mirrors the config contract: a leading `.` prefixes
//! the host namespace, a name containing `::` is fully qualified, and a
//! bare name lives in the built-in namespace.

use std::collections::HashMap;

use anyhow::{bail, Context, Result};

use crate::theme::StyleContext;
use crate::widgets::indicator::{ArcSpinner, ProgressIndicator};

/// Namespace the built-in variants are registered under.
pub const BUILTIN_NAMESPACE: &str = "morpho::indicator";

/// Constructor taking the full style context (theme, raw button settings,
/// and the two style-resolution tokens).
pub type ThemedCtor = fn(&StyleContext) -> Result<Box<dyn ProgressIndicator>>;

/// Argument-less fallback constructor.
pub type PlainCtor = fn() -> Box<dyn ProgressIndicator>;

/// Registered construction paths for one variant. The themed constructor
/// is preferred; the plain one is the fallback.
#[derive(Clone, Copy, Default)]
pub struct IndicatorFactory {
    pub themed: Option<ThemedCtor>,
    pub plain: Option<PlainCtor>,
}

impl IndicatorFactory {
    pub fn themed(ctor: ThemedCtor) -> Self {
        Self {
            themed: Some(ctor),
            plain: None,
        }
    }

    pub fn plain(ctor: PlainCtor) -> Self {
        Self {
            themed: None,
            plain: Some(ctor),
        }
    }

    pub fn with_plain(mut self, ctor: PlainCtor) -> Self {
        self.plain = Some(ctor);
        self
    }
}

/// Name -> factory registry for progress indicator variants.
pub struct IndicatorRegistry {
    host_namespace: String,
    entries: HashMap<String, IndicatorFactory>,
}

impl IndicatorRegistry {
    /// Registry with the built-in variants pre-registered. The host
    /// namespace anchors leading-dot names from the config.
    pub fn new(host_namespace: &str) -> Self {
        let mut registry = Self {
            host_namespace: host_namespace.to_string(),
            entries: HashMap::new(),
        };
        registry.register(
            &format!("{BUILTIN_NAMESPACE}::ArcSpinner"),
            IndicatorFactory::themed(ArcSpinner::themed),
        );
        registry
    }

    /// Register a variant under a fully qualified name.
    pub fn register(&mut self, name: &str, factory: IndicatorFactory) {
        self.entries.insert(name.to_string(), factory);
    }

    /// Expand a configured name to its fully qualified form.
    fn resolve_name(&self, name: &str) -> String {
        if let Some(rest) = name.strip_prefix('.') {
            return format!("{}::{}", self.host_namespace, rest);
        }
        if name.contains("::") {
            return name.to_string();
        }
        format!("{BUILTIN_NAMESPACE}::{name}")
    }

    /// Construct the named variant, or the built-in arc spinner when no
    /// name was configured. Any failure for an explicitly configured name
    /// is fatal; the default is never silently substituted.
    pub fn construct(
        &self,
        name: Option<&str>,
        ctx: &StyleContext,
    ) -> Result<Box<dyn ProgressIndicator>> {
        let raw = name.map(str::trim).filter(|n| !n.is_empty());
        let raw = match raw {
            Some(raw) => raw,
            None => {
                let indicator = ArcSpinner::themed(ctx)?;
                validate_contract(indicator.as_ref())
                    .context("built-in arc spinner violates the indicator contract")?;
                return Ok(indicator);
            }
        };

        let full = self.resolve_name(raw);
        tracing::debug!(name = %raw, resolved = %full, "constructing progress indicator");

        let factory = match self.entries.get(&full) {
            Some(factory) => factory,
            None => bail!("unable to find progress indicator `{full}` (configured as `{raw}`)"),
        };

        let indicator = if let Some(themed) = factory.themed {
            themed(ctx).with_context(|| format!("could not construct progress indicator `{full}`"))?
        } else if let Some(plain) = factory.plain {
            plain()
        } else {
            bail!("no usable constructor registered for progress indicator `{full}`");
        };

        validate_contract(indicator.as_ref())
            .with_context(|| format!("progress indicator `{full}` violates the indicator contract"))?;
        Ok(indicator)
    }
}

/// Eager capability check: the declared animation parameters must be
/// drivable before the widget is handed out.
fn validate_contract(indicator: &dyn ProgressIndicator) -> Result<()> {
    let (from, to) = indicator.values();
    if !from.is_finite() || !to.is_finite() || to <= from {
        bail!("value range must be finite and ascending, got [{from}, {to})");
    }
    if indicator.duration().is_zero() {
        bail!("animation duration must be positive");
    }
    Ok(())
}
