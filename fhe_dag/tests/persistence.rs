//! Artifact save/load behavior across a full pipeline round.

use fhe_dag::{
    ARTIFACT_VERSION, Dag, DataTag, DecryptError, Valuation, peek_algorithm_version,
    peek_graph_version, peek_inputs_version, peek_outputs_version,
};
use tempfile::TempDir;

fn run_round(dag: &mut Dag) {
    dag.compile().unwrap();
    dag.generate_keys().unwrap();
    let mut inputs = Valuation::new();
    inputs.insert("a".to_string(), 4.0.into());
    inputs.insert("b".to_string(), 5.0.into());
    dag.encrypt_inputs(&inputs).unwrap();
    dag.execute().unwrap();
}

fn build_dag() -> Dag {
    let mut dag = Dag::new("persist", 16);
    let a = dag.declare_input("a", DataTag::Ciphertext);
    let b = dag.declare_input("b", DataTag::Ciphertext);
    dag.declare_output("output", &((a + b) * 2.0));
    dag
}

#[test]
fn test_artifact_headers() {
    let dir = TempDir::new().unwrap();
    let mut dag = build_dag();
    run_round(&mut dag);

    dag.save_graph(dir.path().join("dag.bin")).unwrap();
    dag.save_algorithm_info(dir.path().join("algorithm.bin"))
        .unwrap();
    dag.save_inputs(dir.path().join("inputs.bin")).unwrap();
    dag.save_outputs(dir.path().join("outputs.bin")).unwrap();

    let graph_bytes = std::fs::read(dir.path().join("dag.bin")).unwrap();
    let algorithm_bytes = std::fs::read(dir.path().join("algorithm.bin")).unwrap();
    let input_bytes = std::fs::read(dir.path().join("inputs.bin")).unwrap();
    let output_bytes = std::fs::read(dir.path().join("outputs.bin")).unwrap();

    assert_eq!(peek_graph_version(&graph_bytes).unwrap(), ARTIFACT_VERSION);
    assert_eq!(
        peek_algorithm_version(&algorithm_bytes).unwrap(),
        ARTIFACT_VERSION
    );
    assert_eq!(peek_inputs_version(&input_bytes).unwrap(), ARTIFACT_VERSION);
    assert_eq!(
        peek_outputs_version(&output_bytes).unwrap(),
        ARTIFACT_VERSION
    );

    // Headers are not interchangeable between artifact kinds.
    assert!(peek_graph_version(&output_bytes).is_err());
}

#[test]
fn test_graph_roundtrip_executes_identically() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dag.bin");

    let dag = build_dag();
    dag.save_graph(&path).unwrap();

    let mut restored = Dag::new("placeholder", 1);
    restored.load_graph(&path).unwrap();
    assert_eq!(restored.name(), "persist");
    assert_eq!(restored.size(), 16);

    run_round(&mut restored);
    let outputs = restored.decrypt_outputs().unwrap();
    assert_eq!(outputs["output"].as_scalar().unwrap(), 18.0);
}

#[test]
fn test_foreign_outputs_fail_decryption() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("outputs.bin");

    let mut producer = build_dag();
    run_round(&mut producer);
    producer.save_outputs(&path).unwrap();

    // A second round holds different key material, so outputs saved by the
    // first cannot be decrypted under it.
    let mut consumer = build_dag();
    run_round(&mut consumer);
    consumer.load_outputs(&path).unwrap();
    assert!(matches!(
        consumer.decrypt_outputs().unwrap_err(),
        DecryptError::WrongKey { .. }
    ));
}

#[test]
fn test_save_before_stage_fails() {
    let dir = TempDir::new().unwrap();
    let dag = build_dag();
    assert!(dag.save_algorithm_info(dir.path().join("algorithm.bin")).is_err());
    assert!(dag.save_inputs(dir.path().join("inputs.bin")).is_err());
    assert!(dag.save_outputs(dir.path().join("outputs.bin")).is_err());
}
