use stagehand::ops::{self, DockerOperation, Envelope};

use crate::commands::StepArgs;

pub fn run(args: StepArgs) -> stagehand::Result<Envelope> {
    let params = args.parameters()?;
    Ok(ops::execute(&DockerOperation::new(params)))
}
