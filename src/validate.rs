use quick_xml::events::Event;
use quick_xml::Reader;
use std::fmt;

const SUITE_TAG: &str = "testsuite";
const SUITES_TAG: &str = "testsuites";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Checks that a candidate report parses as well-formed XML and that its
/// root element is `<testsuite>` or `<testsuites>`. Parse failures surface
/// the parser's message verbatim; a wrong root uses a fixed message.
pub fn validate_report(content: &[u8]) -> Result<(), ValidationError> {
    let mut reader = Reader::from_reader(content);
    reader.config_mut().check_end_names = true;

    let mut buf = Vec::new();
    let mut root: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(start)) | Ok(Event::Empty(start)) => {
                if root.is_none() {
                    root = Some(String::from_utf8_lossy(start.name().as_ref()).into_owned());
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(ValidationError {
                    message: err.to_string(),
                })
            }
            Ok(_) => {}
        }
        buf.clear();
    }

    match root.as_deref() {
        Some(SUITE_TAG) | Some(SUITES_TAG) => Ok(()),
        _ => Err(ValidationError {
            message: format!("root element must be <{SUITE_TAG}> or <{SUITES_TAG}>"),
        }),
    }
}
