/// Builds a [`Listener`](crate::Listener) that forwards every notification to
/// `handler.method(id, value)`. `handler` must be cheap to clone (an `Arc`).
#[macro_export]
macro_rules! listener {
    ($handler:ident.$method:ident) => {
        $crate::Listener::new({
            let handler = $handler.clone(); // Clone the handler
            move |id, value| {
                handler.$method(id, value);
            }
        })
    };
}
