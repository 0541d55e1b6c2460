//! Errors raised while loading maps and movement profiles from disk
//!

/// Failure to build a structure from an external data source
#[derive(Debug, thiserror::Error)]
pub enum PathfindingError {
	/// The file or directory could not be read
	#[error("failed to read `{path}`: {source}")]
	Io {
		/// Location that was being read
		path: String,
		/// Underlying IO failure
		#[source]
		source: std::io::Error,
	},
	/// A `ron` file did not describe the expected structure
	#[cfg(feature = "ron")]
	#[error("failed deserializing `{path}`: {source}")]
	Ron {
		/// Location of the `ron` file
		path: String,
		/// Underlying parse failure with its position in the file
		#[source]
		source: ron::error::SpannedError,
	},
	/// A CSV file could not be parsed
	#[cfg(feature = "csv")]
	#[error("failed parsing csv `{path}`: {source}")]
	Csv {
		/// Location of the CSV file
		path: String,
		/// Underlying CSV failure
		#[source]
		source: csv::Error,
	},
	/// A heightmap image could not be decoded
	#[cfg(feature = "heightmap")]
	#[error("failed opening heightmap `{path}`: {message}")]
	Heightmap {
		/// Location of the image
		path: String,
		/// Description of the decoding failure
		message: String,
	},
	/// The data was readable but does not describe a valid map
	#[error("invalid map data: {0}")]
	InvalidMap(String),
}
