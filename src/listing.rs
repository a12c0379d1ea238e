//! Collection views: ordering and filtering decorators around a base fetch.
//!
//! Both decorators augment the collection handed back by the fetch and the context
//! exposed to the presentation layer. [`ListView`] composes them.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::hash::Hash;

/// Raw query-string parameters of a collection request.
pub type QueryParams = HashMap<String, String>;

/// Query parameter carrying the requested ordering.
pub const ORDERING_PARAM: &str = "ordering";

// --- Ordering ---

/// OrderingOptions
///
/// `fields` lists the orderable columns shown to the UI; `default` is the static
/// ordering used when the request names none.
#[derive(Debug, Clone, Default)]
pub struct OrderingOptions {
    pub fields: Vec<String>,
    pub default: Vec<String>,
}

impl OrderingOptions {
    pub fn new(fields: &[&str], default: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            default: default.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// resolve
    ///
    /// The `ordering` query parameter, used verbatim when present and non-empty.
    /// Otherwise the first default ordering; with no default the result is `None`.
    /// The token is not checked against `fields`; the store ignores columns it
    /// does not have.
    pub fn resolve(&self, params: &QueryParams) -> Option<String> {
        params
            .get(ORDERING_PARAM)
            .filter(|token| !token.is_empty())
            .cloned()
            .or_else(|| self.default.first().cloned())
    }
}

// --- Filtering ---

/// FilterOutcome
///
/// A refined collection plus the echoable state of the filters that produced it.
#[derive(Debug, Clone)]
pub struct FilterOutcome<T, S> {
    pub items: Vec<T>,
    pub state: S,
}

/// FilterSet
///
/// A filter schema: validates raw parameters and narrows a collection with them.
/// Malformed values must be absorbed here and reported through the state as
/// unapplied; `apply` itself cannot fail.
pub trait FilterSet: Send + Sync {
    type Item;
    type State: Serialize;

    fn apply(
        &self,
        params: &QueryParams,
        base: Vec<Self::Item>,
    ) -> FilterOutcome<Self::Item, Self::State>;
}

/// Drops repeated items, keeping the first occurrence and the original order.
pub fn distinct<T>(items: Vec<T>) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Runs a filter set over `base` and deduplicates the refined collection.
pub fn filter_collection<F>(
    filterset: &F,
    params: &QueryParams,
    base: Vec<F::Item>,
) -> FilterOutcome<F::Item, F::State>
where
    F: FilterSet,
    F::Item: Eq + Hash + Clone,
{
    let outcome = filterset.apply(params, base);
    FilterOutcome {
        items: distinct(outcome.items),
        state: outcome.state,
    }
}

// --- Composition ---

/// ListContext
///
/// What a list view hands to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct ListContext<T, S> {
    pub items: Vec<T>,
    pub ordering_fields: Vec<String>,
    pub order_by: Option<String>,
    pub filter: S,
}

/// ListView
///
/// Ordering and filtering stacked on top of a base fetch.
pub struct ListView<F> {
    pub ordering: OrderingOptions,
    pub filterset: F,
}

impl<F> ListView<F>
where
    F: FilterSet,
    F::Item: Eq + Hash + Clone,
{
    pub fn new(ordering: OrderingOptions, filterset: F) -> Self {
        Self {
            ordering,
            filterset,
        }
    }

    /// load
    ///
    /// Resolves the ordering, passes it to `fetch`, filters and deduplicates the
    /// result, then assembles the context.
    pub async fn load<Fetch, Fut>(
        &self,
        params: &QueryParams,
        fetch: Fetch,
    ) -> ListContext<F::Item, F::State>
    where
        Fetch: FnOnce(Option<String>) -> Fut,
        Fut: Future<Output = Vec<F::Item>>,
    {
        let order_by = self.ordering.resolve(params);
        let base = fetch(order_by.clone()).await;
        let FilterOutcome { items, state } = filter_collection(&self.filterset, params, base);

        ListContext {
            items,
            ordering_fields: self.ordering.fields.clone(),
            order_by,
            filter: state,
        }
    }
}
