use notebook_types::User;

use crate::error::ParseError;

pub const DELIMITER: char = ',';

const ESCAPE: char = '\\';
const FIELD_COUNT: usize = 4;

/// Converts records to and from single lines of the store file.
///
/// A line is `id,first_name,last_name,phone`. Inside a field, `\` is written
/// as `\\`, the delimiter as `\,` and line breaks as `\n` / `\r`, so any field
/// content survives a round trip. Fields without those characters are written
/// as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserMapper;

impl UserMapper {
    pub fn new() -> Self {
        Self
    }

    pub fn serialize(&self, user: &User) -> String {
        let mut line = user.id.to_string();
        for field in [&user.first_name, &user.last_name, &user.phone] {
            line.push(DELIMITER);
            escape_into(&mut line, field);
        }
        line
    }

    pub fn deserialize(&self, line: &str) -> Result<User, ParseError> {
        let fields = split_fields(line)?;
        let found = fields.len();
        let Ok([id, first_name, last_name, phone]) = <[String; FIELD_COUNT]>::try_from(fields)
        else {
            return Err(ParseError::FieldCount {
                expected: FIELD_COUNT,
                found,
            });
        };

        let id = id
            .trim()
            .parse::<u64>()
            .map_err(|source| ParseError::InvalidId {
                value: id.clone(),
                source,
            })?;

        Ok(User {
            id,
            first_name,
            last_name,
            phone,
        })
    }

    /// Checks that every non-blank line decodes, reporting the first failure
    /// with its 1-based line number.
    pub fn verify_lines<S: AsRef<str>>(&self, lines: &[S]) -> Result<(), (usize, ParseError)> {
        for (i, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            if line.trim().is_empty() {
                continue;
            }
            self.deserialize(line).map_err(|e| (i + 1, e))?;
        }
        Ok(())
    }
}

fn escape_into(out: &mut String, field: &str) {
    for c in field.chars() {
        match c {
            ESCAPE => out.push_str("\\\\"),
            DELIMITER => {
                out.push(ESCAPE);
                out.push(DELIMITER);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
}

fn split_fields(line: &str) -> Result<Vec<String>, ParseError> {
    let mut fields = Vec::with_capacity(FIELD_COUNT);
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            ESCAPE => match chars.next() {
                Some(ESCAPE) => current.push(ESCAPE),
                Some(DELIMITER) => current.push(DELIMITER),
                Some('n') => current.push('\n'),
                Some('r') => current.push('\r'),
                Some(other) => return Err(ParseError::BadEscape(other)),
                None => return Err(ParseError::DanglingEscape),
            },
            DELIMITER => fields.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    fields.push(current);

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann() -> User {
        User::new("Ann", "Lee", "555").with_id(1)
    }

    #[test]
    fn test_serialize_plain() {
        assert_eq!(UserMapper::new().serialize(&ann()), "1,Ann,Lee,555");
    }

    #[test]
    fn test_deserialize_plain() {
        assert_eq!(UserMapper::new().deserialize("1,Ann,Lee,555").unwrap(), ann());
    }

    #[test]
    fn test_round_trip_with_delimiter_and_escapes() {
        let mapper = UserMapper::new();
        let user = User::new("Ann, Jr.", "O\\Lee", "555\n,\r\\").with_id(42);
        let line = mapper.serialize(&user);

        assert!(!line.contains('\n'));
        assert_eq!(line, "42,Ann\\, Jr.,O\\\\Lee,555\\n\\,\\r\\\\");
        assert_eq!(mapper.deserialize(&line).unwrap(), user);
    }

    #[test]
    fn test_empty_fields_round_trip() {
        let mapper = UserMapper::new();
        let user = User::new("", "", "").with_id(7);
        assert_eq!(mapper.serialize(&user), "7,,,");
        assert_eq!(mapper.deserialize("7,,,").unwrap(), user);
    }

    #[test]
    fn test_field_count_errors() {
        let mapper = UserMapper::new();
        assert_eq!(
            mapper.deserialize("1,Ann,Lee"),
            Err(ParseError::FieldCount {
                expected: 4,
                found: 3
            })
        );
        assert_eq!(
            mapper.deserialize("1,Ann,Lee,555,extra"),
            Err(ParseError::FieldCount {
                expected: 4,
                found: 5
            })
        );
        assert_eq!(
            mapper.deserialize(""),
            Err(ParseError::FieldCount {
                expected: 4,
                found: 1
            })
        );
    }

    #[test]
    fn test_invalid_id() {
        let mapper = UserMapper::new();
        assert!(matches!(
            mapper.deserialize("abc,Ann,Lee,555"),
            Err(ParseError::InvalidId { value, .. }) if value == "abc"
        ));
        assert!(matches!(
            mapper.deserialize("-1,Ann,Lee,555"),
            Err(ParseError::InvalidId { .. })
        ));
    }

    #[test]
    fn test_id_tolerates_surrounding_whitespace() {
        assert_eq!(UserMapper::new().deserialize(" 1 ,Ann,Lee,555").unwrap(), ann());
    }

    #[test]
    fn test_verify_lines_accepts_valid_store() {
        let mapper = UserMapper::new();
        assert_eq!(mapper.verify_lines::<&str>(&[]), Ok(()));
        assert_eq!(
            mapper.verify_lines(&["1,Ann,Lee,555", "", "   ", "2,Bo\\, Jr.,Kim,777"]),
            Ok(())
        );
    }

    #[test]
    fn test_verify_lines_reports_first_bad_line() {
        let mapper = UserMapper::new();
        let lines = vec![
            "1,Ann,Lee,555".to_string(),
            String::new(),
            "2,Bo,Kim".to_string(),
            "x,Cy,Park,1".to_string(),
        ];
        assert_eq!(
            mapper.verify_lines(&lines),
            Err((
                3,
                ParseError::FieldCount {
                    expected: 4,
                    found: 3
                }
            ))
        );
    }

    #[test]
    fn test_bad_escapes() {
        let mapper = UserMapper::new();
        assert_eq!(
            mapper.deserialize("1,Ann,Lee,55\\x5"),
            Err(ParseError::BadEscape('x'))
        );
        assert_eq!(
            mapper.deserialize("1,Ann,Lee,555\\"),
            Err(ParseError::DanglingEscape)
        );
    }
}
