use nuspec_core::common::AnalysisConfig;
use nuspec_core::domain::ComputeModule;
use nuspec_core::modules::ModuleExecutor;
use nuspec_core::modules::propagation::{
    InteractModule, OscillateModule, PropagateModule, ReconstructModule,
};

#[derive(Debug, Clone, Copy)]
pub(super) struct StageCommandSpec {
    pub(super) command: &'static str,
    pub(super) module: ComputeModule,
    pub(super) input_artifact: &'static str,
    pub(super) output_artifact: &'static str,
}

pub(super) const STAGE_COMMANDS: [StageCommandSpec; 4] = [
    StageCommandSpec {
        command: "flux2oscflux",
        module: ComputeModule::Oscillate,
        input_artifact: "beam flux vector",
        output_artifact: "oscillated flux block",
    },
    StageCommandSpec {
        command: "oscflux2truespec",
        module: ComputeModule::Interact,
        input_artifact: "oscillated flux block",
        output_artifact: "true spectrum block",
    },
    StageCommandSpec {
        command: "truespec2recospec",
        module: ComputeModule::Reconstruct,
        input_artifact: "true spectrum block",
        output_artifact: "reconstructed spectrum block",
    },
    StageCommandSpec {
        command: "propagate",
        module: ComputeModule::Propagate,
        input_artifact: "beam flux vector",
        output_artifact: "reconstructed spectrum block",
    },
];

pub(super) fn stage_command_spec(command: &str) -> Option<StageCommandSpec> {
    STAGE_COMMANDS
        .iter()
        .copied()
        .find(|spec| spec.command == command)
}

pub(super) fn stage_executor(
    module: ComputeModule,
    config: AnalysisConfig,
) -> Box<dyn ModuleExecutor> {
    match module {
        ComputeModule::Oscillate => Box::new(OscillateModule::new(config)),
        ComputeModule::Interact => Box::new(InteractModule::new(config)),
        ComputeModule::Reconstruct => Box::new(ReconstructModule::new(config)),
        ComputeModule::Propagate => Box::new(PropagateModule::new(config)),
    }
}
