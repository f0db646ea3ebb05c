use stagehand::ops::{self, Envelope, TerraformOperation};

use crate::commands::StepArgs;

pub fn run(args: StepArgs) -> stagehand::Result<Envelope> {
    let params = args.parameters()?;
    Ok(ops::execute(&TerraformOperation::new(params)))
}
