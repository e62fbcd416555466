// self
use crate::_prelude::*;

/// Errors raised while parsing identity or credential templates.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum TemplateError {
	/// The template (or one of its alternatives) is empty.
	#[error("Template alternative {index} is empty.")]
	EmptyAlternative {
		/// Zero-based alternative index.
		index: usize,
	},
	/// A `${` was never closed.
	#[error("Placeholder opened at byte {offset} is not terminated.")]
	Unterminated {
		/// Byte offset of the opening `${` within its alternative.
		offset: usize,
	},
	/// Placeholder names must be ASCII alphanumerics or underscores.
	#[error("Placeholder name `{name}` is invalid.")]
	InvalidPlaceholder {
		/// Offending placeholder name.
		name: String,
	},
	/// Two placeholders without a literal between them cannot be captured.
	#[error("Placeholders `{first}` and `{second}` must be separated by literal text.")]
	AdjacentPlaceholders {
		/// Left placeholder.
		first: String,
		/// Right placeholder.
		second: String,
	},
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
	Literal(String),
	Placeholder(String),
}

#[derive(Debug, PartialEq, Eq)]
enum Capture {
	Bound(BTreeMap<String, String>),
	// Literals matched but a placeholder came out empty.
	Blank,
	Mismatch,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Alternative {
	text: String,
	segments: Vec<Segment>,
}

/// Placeholder pattern describing the shape of an identity or credential.
///
/// Placeholders use the `${name}` syntax and alternatives are separated by `|`, so
/// `${tenantName}:${userName}|${userName}` accepts both `demo:admin` and `admin`. Alternatives
/// are tried in declaration order.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Template {
	source: String,
	alternatives: Vec<Alternative>,
}
impl Template {
	/// Parses a template.
	pub fn parse(text: impl Into<String>) -> Result<Self, TemplateError> {
		let source = text.into();
		let alternatives = source
			.split('|')
			.enumerate()
			.map(|(index, text)| parse_alternative(index, text))
			.collect::<Result<Vec<_>, _>>()?;

		Ok(Self { source, alternatives })
	}

	/// Raw template text.
	pub fn as_str(&self) -> &str {
		&self.source
	}

	/// Placeholder names in first-appearance order, without duplicates.
	pub fn placeholders(&self) -> Vec<&str> {
		let mut seen = Vec::new();

		for segment in self.alternatives.iter().flat_map(|alt| alt.segments.iter()) {
			if let Segment::Placeholder(name) = segment
				&& !seen.contains(&name.as_str())
			{
				seen.push(name.as_str());
			}
		}

		seen
	}

	/// Binds `input` to placeholder values using the first alternative that matches it.
	///
	/// Input whose literal text fits an alternative but leaves one of its placeholders empty
	/// (`demo:` against `${tenantName}:${userName}`) is rejected outright instead of falling
	/// through to later alternatives.
	pub fn capture(&self, input: &str) -> Option<BTreeMap<String, String>> {
		for alt in &self.alternatives {
			match capture_alternative(&alt.segments, input) {
				Capture::Bound(values) => return Some(values),
				Capture::Blank => return None,
				Capture::Mismatch => {},
			}
		}

		None
	}

	/// Renders the first alternative whose placeholders are all present in `values`.
	pub fn render(&self, values: &BTreeMap<String, String>) -> Option<String> {
		self.alternatives.iter().find_map(|alt| {
			alt.segments.iter().try_fold(String::new(), |mut out, segment| {
				match segment {
					Segment::Literal(text) => out.push_str(text),
					Segment::Placeholder(name) => out.push_str(values.get(name)?),
				}

				Some(out)
			})
		})
	}
}
impl Debug for Template {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Template").field(&self.source).finish()
	}
}
impl Display for Template {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		for (idx, alt) in self.alternatives.iter().enumerate() {
			if idx > 0 {
				f.write_str(" or ")?;
			}

			f.write_str(&alt.text)?;
		}

		Ok(())
	}
}
impl FromStr for Template {
	type Err = TemplateError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}
impl TryFrom<String> for Template {
	type Error = TemplateError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(value)
	}
}
impl From<Template> for String {
	fn from(value: Template) -> Self {
		value.source
	}
}

fn parse_alternative(index: usize, text: &str) -> Result<Alternative, TemplateError> {
	if text.is_empty() {
		return Err(TemplateError::EmptyAlternative { index });
	}

	let mut segments = Vec::new();
	let mut rest = text;
	let mut offset = 0;

	while let Some(start) = rest.find("${") {
		if start > 0 {
			segments.push(Segment::Literal(rest[..start].to_owned()));
		}

		let after = &rest[start + 2..];
		let end = after.find('}').ok_or(TemplateError::Unterminated { offset: offset + start })?;
		let name = &after[..end];

		if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
			return Err(TemplateError::InvalidPlaceholder { name: name.to_owned() });
		}
		if let Some(Segment::Placeholder(first)) = segments.last() {
			return Err(TemplateError::AdjacentPlaceholders {
				first: first.clone(),
				second: name.to_owned(),
			});
		}

		segments.push(Segment::Placeholder(name.to_owned()));

		let consumed = start + 2 + end + 1;

		offset += consumed;
		rest = &rest[consumed..];
	}

	if !rest.is_empty() {
		segments.push(Segment::Literal(rest.to_owned()));
	}

	Ok(Alternative { text: text.to_owned(), segments })
}

fn capture_alternative(segments: &[Segment], input: &str) -> Capture {
	let mut values = BTreeMap::new();
	let mut blank = false;
	let mut rest = input;

	for (idx, segment) in segments.iter().enumerate() {
		match segment {
			Segment::Literal(text) => match rest.strip_prefix(text.as_str()) {
				Some(remaining) => rest = remaining,
				None => return Capture::Mismatch,
			},
			Segment::Placeholder(name) => {
				let (value, remaining) = match segments.get(idx + 1) {
					Some(Segment::Literal(next)) => match rest.find(next.as_str()) {
						Some(at) => (&rest[..at], &rest[at..]),
						None => return Capture::Mismatch,
					},
					Some(Segment::Placeholder(_)) => return Capture::Mismatch,
					None => (rest, ""),
				};

				if value.is_empty() {
					blank = true;
				} else if values.get(name).is_some_and(|existing| existing != value) {
					return Capture::Mismatch;
				} else {
					values.insert(name.clone(), value.to_owned());
				}

				rest = remaining;
			},
		}
	}

	match (rest.is_empty(), blank) {
		(false, _) => Capture::Mismatch,
		(true, true) => Capture::Blank,
		(true, false) => Capture::Bound(values),
	}
}
