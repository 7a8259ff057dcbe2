//! Procedural macros for Kiln.
//!
//! - `#[component]` - Attribute macro turning an `impl` block into a `Component`

use proc_macro::TokenStream;

mod component;

/// Implement `Component` for the type of an `impl` block.
///
/// Every `pub` method taking `&self` becomes invocable by name. Arguments are
/// produced positionally through `FromArgument` (serde decoding, or the run's
/// `ContextMap`); return values go through `IntoOutput`.
/// Declared parameter names are recorded so extractor context names can be
/// derived from them.
///
/// Options:
/// - `injectable` - also implement `Injectable` through `Default`
/// - `properties = field` - expose `self.field` as the instance properties
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct OrdersController {
///     properties: Properties,
/// }
///
/// #[kiln::component(injectable, properties = properties)]
/// impl OrdersController {
///     pub async fn created(&self, payload: Value) -> Value {
///         payload
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn component(attr: TokenStream, item: TokenStream) -> TokenStream {
    component::component_impl(attr, item)
}
