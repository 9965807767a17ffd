//! `Db` owns an adapter for its lifetime; `Tx` borrows a
//! transaction-scoped one.

use rowmap_core::{Adapter, Dialect, Error, RowmapConfig};

use crate::provider::Provider;
use crate::session::Session;

/// The entry point: an adapter plus the dialect it speaks.
pub struct Db {
    adapter: Box<dyn Adapter + Send + Sync>,
    dialect: Dialect,
    config: RowmapConfig,
}

impl Db {
    pub fn new<A>(adapter: A) -> Result<Self, Error>
    where
        A: Adapter + Send + Sync + 'static,
    {
        Self::with_config(adapter, RowmapConfig::default())
    }

    /// Fails with `Config` if the adapter names an unsupported dialect.
    pub fn with_config<A>(adapter: A, config: RowmapConfig) -> Result<Self, Error>
    where
        A: Adapter + Send + Sync + 'static,
    {
        let dialect: Dialect = adapter.dialect().parse()?;
        tracing::debug!(dialect = %dialect, "rowmap: db ready");
        Ok(Self {
            adapter: Box::new(adapter),
            dialect,
            config,
        })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn config(&self) -> &RowmapConfig {
        &self.config
    }

    /// Close the underlying adapter. Later calls fail with a closed error.
    pub fn close(&self) -> Result<(), Error> {
        self.adapter.close()
    }
}

impl Provider for Db {
    fn session(&self) -> Session<'_> {
        Session::new(
            &*self.adapter,
            self.dialect,
            self.config.effective_default_id_column(),
        )
    }
}

/// A transaction handle passed to `Provider::transaction` bodies.
pub struct Tx<'a> {
    adapter: &'a dyn Adapter,
    dialect: Dialect,
    default_id_column: &'a str,
}

impl<'a> Tx<'a> {
    pub(crate) fn new(adapter: &'a dyn Adapter, dialect: Dialect, default_id_column: &'a str) -> Self {
        Self {
            adapter,
            dialect,
            default_id_column,
        }
    }
}

impl Provider for Tx<'_> {
    fn session(&self) -> Session<'_> {
        Session::new(self.adapter, self.dialect, self.default_id_column)
    }
}
