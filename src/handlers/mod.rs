// Route handlers. `drinks` holds the resource endpoints; the permission each
// one needs is attached where the router is built (see `api::app`).
pub mod drinks;
pub mod health;
