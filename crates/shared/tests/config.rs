use std::io::Write;

use feedkit_shared::config::DEFAULT_PAGE_SIZE;
use feedkit_shared::{ClientConfig, Error};
use pretty_assertions::assert_eq;

#[test]
fn loads_file_sections() {
	let mut file = tempfile::NamedTempFile::new().unwrap();
	writeln!(
		file,
		r#"
page-size = 50

[transport]
graphql-url = "http://localhost:4000/graphql"

[cache]
capacity = 8
"#
	)
	.unwrap();

	let config = ClientConfig::from_toml(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
	assert_eq!(config.page_size, 50);
	assert_eq!(config.transport.graphql_url.as_str(), "http://localhost:4000/graphql");
	assert_eq!(config.transport.timeout_secs, 30);
	assert_eq!(config.cache.capacity, 8);
}

#[test]
fn missing_file_yields_defaults() {
	let dir = tempfile::tempdir().unwrap();
	let config = ClientConfig::load(&dir.path().join("feedkit.toml")).unwrap();
	assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
	assert_eq!(config.cache, ClientConfig::default().cache);
}

#[test]
fn malformed_file_is_a_parse_error() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("feedkit.toml");
	std::fs::write(&path, "[transport\n").unwrap();
	assert!(matches!(ClientConfig::load(&path), Err(Error::Parse(_))));
}

#[test]
fn unreadable_path_is_an_io_error() {
	let dir = tempfile::tempdir().unwrap();
	// A directory cannot be read as a file.
	let err = ClientConfig::load(dir.path()).unwrap_err();
	assert!(matches!(err, Error::Io { .. }));
}
