use std::sync::OnceLock;

use anyhow::{Context, Result};

use crate::pipeline::record::FrameRecord;
use crate::ConfigurationError;

/// Stage metadata checked at registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageDescriptor {
    /// Name used by `PipelineRunner::remove` and in logs.
    pub name: &'static str,
}

/// One processing step of the per-frame pipeline.
pub trait Stage {
    fn descriptor(&self) -> StageDescriptor;

    /// Take the record, update it, hand it back.
    fn process(&mut self, record: FrameRecord) -> Result<FrameRecord>;
}

/// Stage names must match `^[a-z0-9_-]{1,64}$`.
pub fn validate_stage_name(name: &str) -> Result<(), ConfigurationError> {
    static STAGE_NAME_RE: OnceLock<regex::Regex> = OnceLock::new();
    let re = STAGE_NAME_RE.get_or_init(|| {
        regex::Regex::new(r"^[a-z0-9_-]{1,64}$").expect("stage name pattern is valid")
    });

    if !re.is_match(name) {
        return Err(ConfigurationError::new(
            "stage",
            format!("name {:?} must match ^[a-z0-9_-]{{1,64}}$", name),
        ));
    }
    Ok(())
}

/// Ordered list of stages applied to every frame.
#[derive(Default)]
pub struct PipelineRunner {
    stages: Vec<Box<dyn Stage>>,
}

impl PipelineRunner {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a stage. It runs after every stage registered before it.
    pub fn add<S: Stage + 'static>(&mut self, stage: S) -> Result<(), ConfigurationError> {
        self.add_boxed(Box::new(stage))
    }

    pub fn add_boxed(&mut self, stage: Box<dyn Stage>) -> Result<(), ConfigurationError> {
        let desc = stage.descriptor();
        validate_stage_name(desc.name)?;
        log::debug!("pipeline: registered stage {}", desc.name);
        self.stages.push(stage);
        Ok(())
    }

    /// Remove the first stage named `name`. Returns whether one was found.
    pub fn remove(&mut self, name: &str) -> bool {
        match self
            .stages
            .iter()
            .position(|stage| stage.descriptor().name == name)
        {
            Some(index) => {
                self.stages.remove(index);
                log::debug!("pipeline: removed stage {}", name);
                true
            }
            None => false,
        }
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages
            .iter()
            .map(|stage| stage.descriptor().name)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage on `record`, in order. The first stage error aborts
    /// the frame.
    pub fn run(&mut self, mut record: FrameRecord) -> Result<FrameRecord> {
        let frame_number = record.frame_number;
        for stage in &mut self.stages {
            let name = stage.descriptor().name;
            record = stage
                .process(record)
                .with_context(|| format!("stage {} failed on frame #{}", name, frame_number))?;
        }
        log::debug!("frame #{} processed", frame_number);
        Ok(record)
    }
}
