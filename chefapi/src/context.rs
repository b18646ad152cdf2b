use chefapi_chef_server::{Config, Connection};
use chefapi_core::{Context, Error, OsEnv, Result};
use chefapi_file_read_std::StdFileRead;
use chefapi_http_send_reqwest::ReqwestHttpSend;
use log::debug;

/// Build a context that reads files from disk, takes env from the process
/// and sends requests with reqwest, honoring the proxy, TLS and timeout
/// options of `config`.
pub fn default_context(config: &Config) -> Result<Context> {
    let ctx = Context::new().with_file_read(StdFileRead).with_env(OsEnv);

    let mut builder = ReqwestHttpSend::builder().ssl_verify(config.ssl_verify());
    if let Some(address) = &config.proxy_address {
        debug!("sending requests through proxy {address}");
        builder = builder.proxy(
            address,
            config.proxy_port,
            config.proxy_username.as_deref(),
            config.proxy_password.as_deref(),
        );
    }
    if let Some(path) = &config.ssl_pem_file {
        let path = ctx
            .expand_home_dir(path)
            .ok_or_else(|| Error::config_invalid(format!("can't expand {path}")))?;
        let pem = ctx.file_read(&path).map_err(|e| {
            Error::config_invalid(format!("failed to read ssl pem file {path}")).with_source(e)
        })?;
        builder = builder.ca_pem(pem);
    }
    if let Some(timeout) = config.read_timeout() {
        builder = builder.read_timeout(timeout);
    }

    Ok(ctx.with_http_send(builder.build()?))
}

/// Connect with `config`, filling its unset fields from `CHEFAPI_*` env and
/// the config file.
pub fn connect(config: Config) -> Result<Connection> {
    let base = Context::new().with_file_read(StdFileRead).with_env(OsEnv);
    let config = config.from_env(&base).from_config_file(&base)?;
    debug!("connecting with {config:?}");

    let ctx = default_context(&config)?;
    Ok(Connection::new(ctx, &config))
}
