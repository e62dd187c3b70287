//! Component invocation inside a render context scope.

use crate::http::error::RoutingError;
use crate::render::args::ComponentArgs;
use crate::routing::{Callable, Output, RouteComponent};
use crate::views::RenderContext;

/// Run `component` with `ctx` installed as the current render context.
///
/// Blocking callables go to the blocking pool so they never stall other
/// in-flight requests; the scope is entered on that thread.
pub async fn invoke(
    component: &RouteComponent,
    args: ComponentArgs,
    ctx: &RenderContext,
) -> Result<Output, RoutingError> {
    tracing::debug!(
        component = %component.name(),
        id = %component.id(),
        is_async = component.is_async(),
        "Invoking component"
    );

    match component.callable() {
        Callable::Async(f) => ctx.scope(f(args)).await,
        Callable::Blocking(f) => {
            let f = f.clone();
            let ctx = ctx.clone();
            tokio::task::spawn_blocking(move || ctx.enter(|| f(args)))
                .await
                .map_err(|err| {
                    tracing::error!(
                        component = %component.name(),
                        error = %err,
                        "Component task failed"
                    );
                    RoutingError::internal("Internal Server Error")
                })?
        }
    }
}
