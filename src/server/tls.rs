// TLS module
// Loads PEM certificate chain and private key into a rustls acceptor

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio_rustls::TlsAcceptor;

use crate::config::TlsPaths;
use crate::error::ServerError;

/// Build a TLS acceptor from the configured certificate and key files
///
/// Only HTTP/1.1 is offered via ALPN.
pub fn load_acceptor(paths: &TlsPaths) -> Result<TlsAcceptor, ServerError> {
    let certs = load_certs(&paths.cert_file)?;
    let key = load_private_key(&paths.key_file)?;

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let mut config = rustls::ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_no_client_auth()
        .with_single_cert(certs, key)?;
    config.alpn_protocols = vec![b"http/1.1".to_vec()];

    Ok(TlsAcceptor::from(Arc::new(config)))
}

fn read_pem(path: &Path) -> Result<Cursor<Vec<u8>>, ServerError> {
    std::fs::read(path)
        .map(Cursor::new)
        .map_err(|source| ServerError::TlsRead {
            path: path.to_path_buf(),
            source,
        })
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, ServerError> {
    let mut reader = read_pem(path)?;
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| ServerError::TlsRead {
            path: path.to_path_buf(),
            source,
        })?;

    if certs.is_empty() {
        return Err(ServerError::TlsNoCertificates(path.to_path_buf()));
    }
    Ok(certs)
}

fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, ServerError> {
    let mut reader = read_pem(path)?;
    rustls_pemfile::private_key(&mut reader)
        .map_err(|source| ServerError::TlsRead {
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| ServerError::TlsNoPrivateKey(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(dir: &tempfile::TempDir, cert: &str, key: &str) -> TlsPaths {
        let cert_file = dir.path().join("cert.pem");
        let key_file = dir.path().join("key.pem");
        std::fs::write(&cert_file, cert).unwrap();
        std::fs::write(&key_file, key).unwrap();
        TlsPaths {
            cert_file,
            key_file,
        }
    }

    #[test]
    fn test_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = TlsPaths {
            cert_file: dir.path().join("nope.pem"),
            key_file: dir.path().join("nope.key"),
        };
        assert!(matches!(
            load_acceptor(&paths),
            Err(ServerError::TlsRead { .. })
        ));
    }

    #[test]
    fn test_no_certificates() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths(&dir, "not a pem file\n", "");
        assert!(matches!(
            load_acceptor(&paths),
            Err(ServerError::TlsNoCertificates(_))
        ));
    }
}
