use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::panic::Exception;

pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::from_default_env())
        .try_init();
}

/// Runs `f`, expecting it to fail, and returns the payload.
pub fn catch_exception<F, R>(f: F) -> Exception
where
    F: FnOnce() -> R,
{
    init_tracing();

    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(_) => panic!("expected the operation to fail"),
        Err(payload) => match payload.downcast::<Exception>() {
            Ok(e) => *e,
            Err(_) => panic!("unwound without an `Exception` payload"),
        },
    }
}
