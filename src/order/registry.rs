//! Order query registry: the named ordering scopes of one entity type.
//!
//! Built once during bootstrap and read-only afterwards. The paginator only ever
//! invokes a comparator that was looked up here, so a caller-chosen `sort_by`
//! can never select anything that was not declared.

use super::{Attribute, OrderSpec, Orderable, REVERSE_SUFFIX};
use crate::error::RegistryError;
use std::cmp::Ordering;
use std::marker::PhantomData;
use tracing::warn;

/// Scope used when the caller asks for nothing or for something unknown.
pub const DEFAULT_SCOPE: &str = "newest_first";

/// Collects scopes for an entity type before freezing them into an [`OrderRegistry`].
pub struct OrderRegistryBuilder<E: Orderable> {
    page_key_attributes: Vec<E::Attribute>,
    scopes: Vec<(String, OrderSpec<E::Attribute>)>,
    default_scope: String,
}

impl<E: Orderable> OrderRegistryBuilder<E> {
    pub fn new(page_key_attributes: Vec<E::Attribute>) -> Result<Self, RegistryError> {
        if page_key_attributes.is_empty() {
            return Err(RegistryError::MissingPageKeyAttributes);
        }

        Ok(Self {
            page_key_attributes,
            scopes: Vec::new(),
            default_scope: DEFAULT_SCOPE.to_string(),
        })
    }

    /// Register a named scope. Registering a name twice keeps the first spec.
    pub fn register(
        mut self,
        name: impl Into<String>,
        spec: OrderSpec<E::Attribute>,
    ) -> Result<Self, RegistryError> {
        let name = name.into();
        if name.trim().is_empty() || name != name.trim() || name.ends_with(REVERSE_SUFFIX) {
            return Err(RegistryError::InvalidScopeName(name));
        }
        if spec.terms().is_empty() {
            return Err(RegistryError::EmptySpec(name));
        }
        if let Some(missing) = self
            .page_key_attributes
            .iter()
            .find(|attribute| !spec.orders_by(**attribute))
        {
            return Err(RegistryError::NotTotal {
                scope: name,
                attribute: missing.name().to_string(),
            });
        }

        match self.scopes.iter().find(|(existing, _)| *existing == name) {
            Some((_, existing_spec)) => {
                if *existing_spec != spec {
                    warn!(scope = %name, "Order scope registered twice with different terms; keeping the first");
                }
            }
            None => self.scopes.push((name, spec)),
        }
        Ok(self)
    }

    /// Override the fallback scope (defaults to `newest_first`).
    pub fn default_scope(mut self, name: impl Into<String>) -> Self {
        self.default_scope = name.into();
        self
    }

    pub fn build(self) -> Result<OrderRegistry<E>, RegistryError> {
        let default_index = self
            .scopes
            .iter()
            .position(|(name, _)| *name == self.default_scope)
            .ok_or(RegistryError::UnknownDefault(self.default_scope))?;

        Ok(OrderRegistry {
            page_key_attributes: self.page_key_attributes,
            scopes: self.scopes,
            default_index,
            _entity: PhantomData,
        })
    }
}

/// Immutable set of ordering scopes for entity type `E`.
pub struct OrderRegistry<E: Orderable> {
    page_key_attributes: Vec<E::Attribute>,
    scopes: Vec<(String, OrderSpec<E::Attribute>)>,
    default_index: usize,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Orderable> std::fmt::Debug for OrderRegistry<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderRegistry")
            .field("page_key_attributes", &self.page_key_attributes)
            .field("scopes", &self.scope_names().collect::<Vec<_>>())
            .field("default_scope", &self.default_scope())
            .finish()
    }
}

impl<E: Orderable> OrderRegistry<E> {
    /// Whether `name` is a registered scope. Blank and reverse-suffixed names are not.
    pub fn is_valid_scope(&self, name: Option<&str>) -> bool {
        match name {
            Some(name) if !name.trim().is_empty() => self.spec(name).is_some(),
            _ => false,
        }
    }

    pub fn spec(&self, name: &str) -> Option<&OrderSpec<E::Attribute>> {
        self.scopes
            .iter()
            .find(|(registered, _)| registered == name)
            .map(|(_, spec)| spec)
    }

    /// Registered names in registration order (reverse variants are implied).
    pub fn scope_names(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(|(name, _)| name.as_str())
    }

    pub fn default_scope(&self) -> &str {
        &self.scopes[self.default_index].0
    }

    pub fn page_key_attributes(&self) -> &[E::Attribute] {
        &self.page_key_attributes
    }

    /// Resolve a caller-requested scope, falling back to the default.
    pub fn resolve(&self, requested: Option<&str>, reverse: bool) -> ResolvedScope<'_, E::Attribute> {
        let (base, spec) = requested
            .filter(|name| self.is_valid_scope(Some(*name)))
            .and_then(|name| {
                self.scopes
                    .iter()
                    .find(|(registered, _)| registered == name)
            })
            .unwrap_or(&self.scopes[self.default_index]);

        let name = if reverse {
            format!("{base}{REVERSE_SUFFIX}")
        } else {
            base.to_string()
        };

        ResolvedScope {
            name,
            spec,
            reverse,
        }
    }
}

/// A registry scope chosen for one request, with its traversal direction.
#[derive(Debug, Clone)]
pub struct ResolvedScope<'a, A> {
    pub name: String,
    spec: &'a OrderSpec<A>,
    pub reverse: bool,
}

impl<A: Attribute> ResolvedScope<'_, A> {
    /// Compare two records in traversal order.
    pub fn compare<E>(&self, a: &E, b: &E) -> Ordering
    where
        E: Orderable<Attribute = A>,
    {
        let ordering = self.spec.compare(a, b);
        if self.reverse {
            ordering.reverse()
        } else {
            ordering
        }
    }
}
