pub mod answer;
pub mod form;
pub mod question;
pub mod response;

pub use answer::{AnswerRow, AnswerValue};
pub use form::{FormItem, FormRecord, FormsPage};
pub use question::{FormDefinition, QuestionRecord};
pub use response::{ResponsesPage, Submission};
