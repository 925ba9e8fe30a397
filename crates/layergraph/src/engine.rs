use crate::{GraphLayout, LayoutObserver, LayoutRequest};

/// A layout engine that assigns the vertices of a request to layers
///
/// Every call is self-contained: the engine keeps no state between layouts,
/// so a single engine can serve calls from several threads.
pub trait LayoutEngine {
    type Error;

    /// Compute the layout of the given request, reporting progress to `observer`
    ///
    /// # Errors
    /// Returns an error if the request is rejected by the engine's
    /// configuration or a layout invariant is violated
    fn layout_with<O>(
        &self,
        request: &LayoutRequest,
        observer: &mut O,
    ) -> Result<GraphLayout, Self::Error>
    where
        O: LayoutObserver + ?Sized;

    /// Compute the layout of the given request
    fn layout(&self, request: &LayoutRequest) -> Result<GraphLayout, Self::Error> {
        self.layout_with(request, &mut ())
    }
}
