#![forbid(unsafe_code)]

//! Built-in labels used when no `--labels` file is given.

use tagflow_labels::LabelSet;

const PIPELINE_RUN_LABELS: [(&str, &str); 14] = [
    ("app.kubernetes.io/managed-by", "tekton-pipelines"),
    ("tekton.dev/pipeline", "build-and-deploy"),
    ("tekton.dev/pipelineRun", "build-and-deploy-run-7xk2p"),
    ("tekton.dev/memberOf", "tasks"),
    ("triggers.tekton.dev/eventlistener", "github-listener"),
    ("triggers.tekton.dev/trigger", "github-push"),
    ("triggers.tekton.dev/triggers-eventid", "3f1c9a2e-5d8b-4e7a-9c61-0b2d4f8e7a13"),
    ("app", "storefront"),
    ("env", "staging"),
    ("team", "checkout"),
    ("git.revision", "9e41b07"),
    ("git.branch", "main"),
    ("region", "eu-west-1"),
    ("owner", "platform ops"),
];

/// Fourteen labels in the shape a CI/CD pipeline run carries.
pub fn pipeline_run_labels() -> LabelSet {
    PIPELINE_RUN_LABELS.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_has_fourteen_ordered_labels() {
        let labels = pipeline_run_labels();
        assert_eq!(labels.len(), 14);
        assert_eq!(labels[0].key, "app.kubernetes.io/managed-by");
        assert_eq!(labels[13].value, "platform ops");
    }
}
