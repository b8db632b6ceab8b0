//! Builder-surface query pipelines: comparable-encoded records, a 0/1
//! predicate mask, and frequency-domain payload reduction.

use fhe_dag::{
    Dag, DataTag, Valuation, decode_count_output, decode_frequency_domain_outputs,
    encode_comparable, encode_frequency_domain, query_count, query_sum,
};

const RECORDS: [(&str, [i64; 5]); 4] = [
    ("lhs", [1, 2, 5, 100, 1000]),
    ("rhs", [2, 2, 4, 100, 1001]),
    ("lhs_2", [4, 7, 9, 5, 100]),
    ("rhs_2", [4, 3, 5, 100, 100]),
];

const PAYLOAD: [i64; 5] = [200, 22, 2, 100, 1];

// Predicate (lhs <= rhs) * (lhs_2 != rhs_2) selects records 1 and 3.
const EXPECTED_SUM: i64 = 22 + 100;

fn encoded_inputs() -> Valuation {
    let mut inputs = Valuation::new();
    for (name, values) in RECORDS {
        inputs.insert(name.to_string(), encode_comparable(&values, name).into());
    }
    let (real, imag) = encode_frequency_domain(&PAYLOAD);
    inputs.insert("fft_real".to_string(), real.into());
    inputs.insert("fft_imag".to_string(), imag.into());
    inputs
}

#[test]
fn test_query_sum() {
    let mut dag = Dag::new("test_query", 256);
    dag.set_record_count(PAYLOAD.len());

    let lhs = dag.declare_input("lhs", DataTag::Ciphertext);
    let rhs = dag.declare_input("rhs", DataTag::Ciphertext);
    let lhs_2 = dag.declare_input("lhs_2", DataTag::Ciphertext);
    let rhs_2 = dag.declare_input("rhs_2", DataTag::Ciphertext);
    let fft_real = dag.declare_input("fft_real", DataTag::Ciphertext);
    let fft_imag = dag.declare_input("fft_imag", DataTag::Ciphertext);

    let predicate = lhs.less_equal(&rhs) * lhs_2.not_equals(&rhs_2);
    dag.declare_output("output_real", &query_sum(&fft_real, &predicate));
    dag.declare_output("output_imag", &query_sum(&fft_imag, &predicate));

    dag.compile().unwrap();
    dag.generate_keys().unwrap();
    dag.encrypt_inputs(&encoded_inputs()).unwrap();
    dag.execute().unwrap();

    let sum =
        decode_frequency_domain_outputs(&dag, PAYLOAD.len(), "output_real", "output_imag")
            .unwrap();
    assert_eq!(sum, EXPECTED_SUM);
}

#[test]
fn test_query_count() {
    let mut dag = Dag::new("test_query_cnt", 256);
    dag.set_record_count(PAYLOAD.len());

    let lhs = dag.declare_input("lhs", DataTag::Ciphertext);
    let rhs = dag.declare_input("rhs", DataTag::Ciphertext);
    let lhs_2 = dag.declare_input("lhs_2", DataTag::Ciphertext);
    let rhs_2 = dag.declare_input("rhs_2", DataTag::Ciphertext);
    let _fft_real = dag.declare_input("fft_real", DataTag::Ciphertext);
    let _fft_imag = dag.declare_input("fft_imag", DataTag::Ciphertext);

    let predicate = lhs.less_equal(&rhs).and(lhs_2.not_equals(&rhs_2));
    dag.declare_output("cmp_cnt", &query_count(&predicate));

    dag.compile().unwrap();
    dag.generate_keys().unwrap();
    dag.encrypt_inputs(&encoded_inputs()).unwrap();
    dag.execute().unwrap();

    assert_eq!(decode_count_output(&dag, "cmp_cnt").unwrap(), 2);
}

#[test]
fn test_record_count_must_match_decoder() {
    let mut dag = Dag::new("test_query_mismatch", 256);
    dag.set_record_count(PAYLOAD.len());

    let lhs = dag.declare_input("lhs", DataTag::Ciphertext);
    let rhs = dag.declare_input("rhs", DataTag::Ciphertext);
    let lhs_2 = dag.declare_input("lhs_2", DataTag::Ciphertext);
    let rhs_2 = dag.declare_input("rhs_2", DataTag::Ciphertext);
    let fft_real = dag.declare_input("fft_real", DataTag::Ciphertext);
    let fft_imag = dag.declare_input("fft_imag", DataTag::Ciphertext);

    let predicate = lhs.less_equal(&rhs) * lhs_2.not_equals(&rhs_2);
    dag.declare_output("output_real", &query_sum(&fft_real, &predicate));
    dag.declare_output("output_imag", &query_sum(&fft_imag, &predicate));

    dag.compile().unwrap();
    dag.generate_keys().unwrap();
    dag.encrypt_inputs(&encoded_inputs()).unwrap();
    dag.execute().unwrap();

    let err = decode_frequency_domain_outputs(&dag, 7, "output_real", "output_imag").unwrap_err();
    assert_eq!(
        err,
        fhe_dag::DecryptError::RecordCountMismatch {
            got: 7,
            expected: PAYLOAD.len()
        }
    );
}
