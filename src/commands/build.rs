use stagehand::ops::{self, BuildOperation, Envelope};

use crate::commands::StepArgs;

pub fn run(args: StepArgs) -> stagehand::Result<Envelope> {
    let params = args.parameters()?;
    Ok(ops::execute(&BuildOperation::new(params)))
}
