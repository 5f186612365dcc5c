//! Sync orchestrator.
//!
//! Walks forms, and for each form runs the questions and answers streams with
//! the form's context, writing every row as it arrives. After each form the
//! answers bookmark is advanced and a STATE message written.

use std::collections::BTreeSet;
use std::io::Write;

use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use typeform_core::{ApiSource, Context, State, TapConfig, TapError};

use crate::singer::{Message, SingerWriter};
use crate::streams::answers::{self, ANSWERS};
use crate::streams::forms::{self, FORMS};
use crate::streams::questions::{self, QUESTIONS};
use crate::streams::ALL_STREAMS;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncSummary {
    pub forms: usize,
    pub questions: usize,
    pub answers: usize,
}

pub struct Tap<'a, W: Write> {
    source: &'a dyn ApiSource,
    config: &'a TapConfig,
    state: State,
    out: SingerWriter<W>,
}

impl<'a, W: Write> Tap<'a, W> {
    pub fn new(source: &'a dyn ApiSource, config: &'a TapConfig, state: State, out: W) -> Self {
        Self {
            source,
            config,
            state,
            out: SingerWriter::new(out),
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn into_writer(self) -> W {
        self.out.into_inner()
    }

    pub async fn sync(&mut self) -> Result<SyncSummary, TapError> {
        for definition in ALL_STREAMS.iter() {
            self.out.write(&Message::schema(definition))?;
        }

        let source = self.source;
        let filter = self.config.forms_ids();
        let mut seen = BTreeSet::new();
        let mut summary = SyncSummary::default();

        let mut forms = Box::pin(forms::records(source, filter.as_ref()));
        while let Some(form) = forms.try_next().await? {
            self.out.record(FORMS.name, &form)?;
            summary.forms += 1;

            let context = forms::child_context(&form);
            summary.questions += self.sync_questions(&context).await?;
            summary.answers += self.sync_answers(&context).await?;
            seen.insert(form.id);
        }

        if let Some(ids) = &filter {
            for missing in ids.difference(&seen) {
                tracing::warn!(form_id = %missing, "Configured form was not returned by the API");
            }
        }

        self.out.state(&self.state)?;

        tracing::info!(
            forms = summary.forms,
            questions = summary.questions,
            answers = summary.answers,
            "Sync complete"
        );

        Ok(summary)
    }

    async fn sync_questions(&mut self, context: &Context) -> Result<usize, TapError> {
        let mut rows = Box::pin(questions::records(self.source, context)?);
        let mut count = 0;

        while let Some(question) = rows.try_next().await? {
            self.out.record(QUESTIONS.name, &question)?;
            count += 1;
        }

        tracing::info!(
            stream = QUESTIONS.name,
            form_id = context.get("form_id").unwrap_or_default(),
            count,
            "Stream synced for form"
        );
        Ok(count)
    }

    async fn sync_answers(&mut self, context: &Context) -> Result<usize, TapError> {
        let since = self
            .state
            .starting_value(ANSWERS.name, context)
            .or(self.config.start_date);

        let mut rows = Box::pin(answers::records(self.source, context, since)?);
        let mut latest: Option<DateTime<Utc>> = None;
        let mut count = 0;

        while let Some(row) = rows.try_next().await? {
            if let Some(previous) = latest {
                if row.submitted_at < previous {
                    tracing::warn!(
                        stream = ANSWERS.name,
                        response_id = %row.response_id,
                        submitted_at = %row.submitted_at,
                        previous = %previous,
                        "Answers arrived out of submitted_at order"
                    );
                }
            }
            latest = Some(latest.map_or(row.submitted_at, |p| p.max(row.submitted_at)));

            self.out.record(ANSWERS.name, &row)?;
            count += 1;
        }

        if let (Some(key), Some(value)) = (ANSWERS.replication_key, latest) {
            self.state.advance(ANSWERS.name, context, key, value);
        }
        self.out.state(&self.state)?;

        tracing::info!(
            stream = ANSWERS.name,
            form_id = context.get("form_id").unwrap_or_default(),
            since = ?since,
            count,
            "Stream synced for form"
        );
        Ok(count)
    }
}
