use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::infra_fs::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::Settings;
use anyhow::{Context, anyhow};
use sqlx::{MySql, Pool};
use std::sync::Arc;

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pub access_gate: AccessGate,
    pub portfolio_service: Arc<dyn PortfolioService>,
    pub document_service: Arc<dyn DocumentService>,
    pub upload_limit: u64,
    clock: Arc<dyn Clock>,
    pool: Option<Pool<MySql>>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let mut pool = None;
        let record_store: Arc<dyn RecordStore> = match settings.store.backend.as_str() {
            "memory" => Arc::new(MemoryRecordStore::new()),
            "mysql" => {
                let dsn = settings
                    .store
                    .mysql_dsn
                    .as_deref()
                    .ok_or_else(|| anyhow!("store.mysql_dsn is required for the mysql backend"))?;
                let mysql_pool = Pool::<MySql>::connect(dsn).await?;
                let store = MySqlRecordStore::new(mysql_pool.clone());
                store.ensure_schema().await?;
                pool = Some(mysql_pool);
                Arc::new(store)
            }
            "redis" => {
                let dsn = settings
                    .store
                    .redis_dsn
                    .as_deref()
                    .ok_or_else(|| anyhow!("store.redis_dsn is required for the redis backend"))?;
                let redis_client = redis::Client::open(dsn)?;
                let redis_manager = redis_client.get_connection_manager().await?;
                Arc::new(RedisRecordStore::new(
                    redis_manager,
                    settings.store.redis_prefix.clone(),
                ))
            }
            other => return Err(anyhow!("Unknown store backend: {}", other)),
        };

        let file_store: Arc<dyn FileStore> = match settings.files.backend.as_str() {
            "memory" => Arc::new(MemoryFileStore::new()),
            "disk" => Arc::new(LocalFileStore::new(&settings.files.upload_dir)),
            other => return Err(anyhow!("Unknown files backend: {}", other)),
        };

        let auth_service: Arc<dyn AuthService> = match settings.auth.backend.as_str() {
            "fake" => Arc::new(FakeAuthService::new()),
            "real" => {
                let credential_hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);
                let credential_store: Arc<dyn CredentialStore> = Arc::new(
                    RealCredentialStore::new(record_store.clone(), credential_hasher, clock.clone()),
                );
                let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(
                    JwtConfig {
                        issuer: settings.auth.issuer.clone(),
                        audience: settings.auth.audience.clone(),
                        signing_key: settings.auth.signing_key(),
                    },
                    clock.clone(),
                ));
                Arc::new(RealAuthService::new(credential_store, token_codec))
            }
            other => return Err(anyhow!("Unknown auth backend: {}", other)),
        };

        let portfolio_service: Arc<dyn PortfolioService> = Arc::new(RealPortfolioService::new(
            record_store.clone(),
            clock.clone(),
        ));
        let document_service: Arc<dyn DocumentService> = Arc::new(RealDocumentService::new(
            record_store,
            file_store,
            clock.clone(),
        ));

        info!(
            store = %settings.store.backend,
            files = %settings.files.backend,
            auth = %settings.auth.backend,
            "server assembled"
        );

        Ok(Self {
            access_gate: AccessGate::new(auth_service.clone()),
            auth_service,
            portfolio_service,
            document_service,
            upload_limit: settings.http.upload_limit_bytes,
            clock,
            pool,
        })
    }

    /// Bring the stored state to its initial shape: admin identity, default portfolio
    /// and an empty document registry. Existing records are left alone.
    pub async fn initialize(&self, settings: &Settings) -> anyhow::Result<()> {
        self.auth_service
            .bootstrap_admin(&settings.auth.admin_username, &settings.auth.admin_password)
            .await?;

        let seed = match settings.portfolio.seed_path.as_deref() {
            Some(path) => {
                let json = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("reading portfolio seed {}", path))?;
                serde_json::from_str::<PortfolioDocument>(&json)
                    .with_context(|| format!("parsing portfolio seed {}", path))?
            }
            None => seed_portfolio(self.clock.now())?,
        };
        self.portfolio_service.initialize_if_absent(seed).await?;

        if self.document_service.initialize_if_absent().await? {
            info!("empty document registry created");
        }

        info!("server initialized");
        Ok(())
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        if let Some(pool) = &self.pool {
            pool.close().await;
            info!("mysql pool closed");
        }
    }
}
