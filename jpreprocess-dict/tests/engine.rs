//! The jpreprocess engine on a real `naist-jdic` dictionary.
//!
//! Run with `cargo test --features jpreprocess-engine -- --ignored`. The
//! dictionary at `JPREPROCESS_DICT_PATH` is used when set; otherwise the
//! latest release is downloaded into the data dir.

#![cfg(feature = "jpreprocess-engine")]

use jpreprocess_dict::{jpreprocess, DictionaryVersion, G2pOutput, JPreprocess, NativeFrontend};

const TEXT: &str = "本日は晴天なり";

fn engine() -> JPreprocess<NativeFrontend> {
    jpreprocess(&DictionaryVersion::latest(), None).unwrap()
}

#[test]
#[ignore = "needs the naist-jdic dictionary"]
fn run_frontend_reads_dictionary_entries() {
    let features = engine().run_frontend(TEXT).unwrap();

    assert_eq!(features.len(), 4);
    assert_eq!(features[0].string, "本日");
    assert_eq!(features[0].pos, "名詞");
    assert_eq!(features[0].pos_group1, "副詞可能");
    assert_eq!(features[0].read, "ホンジツ");
    assert_eq!(features[0].pron, "ホンジツ");
    assert_eq!(features[0].acc, 1);
    assert_eq!(features[0].mora_size, 4);
    assert_eq!(features[0].chain_rule, "C1");

    assert_eq!(features[2].string, "晴天");
    assert_eq!(features[2].pron, "セーテン");
    assert_eq!(features[2].acc, 5);
    assert_eq!(features[2].chain_flag, 0);
}

#[test]
#[ignore = "needs the naist-jdic dictionary"]
fn fullcontext_and_make_label_agree() {
    let engine = engine();
    let labels = engine.extract_fullcontext(TEXT).unwrap();

    assert_eq!(labels.len(), 21);
    assert!(labels[0].starts_with("xx^xx-sil+h=o/A:xx+xx+xx"));

    let features = engine.run_frontend(TEXT).unwrap();
    assert_eq!(engine.make_label(&features).unwrap(), labels);
}

#[test]
#[ignore = "needs the naist-jdic dictionary"]
fn g2p_phonemes_and_kana() {
    let engine = engine();

    assert_eq!(
        engine.g2p(TEXT, false, true).unwrap(),
        G2pOutput::Joined("h o N j i ts u w a s e e t e N n a r i".to_string())
    );
    assert_eq!(
        engine.g2p(TEXT, true, true).unwrap(),
        G2pOutput::Joined("ホンジツワセーテンナリ".to_string())
    );
    assert_eq!(
        engine.g2p(TEXT, true, false).unwrap(),
        G2pOutput::Units(
            ["ホンジツ", "ワ", "セーテン", "ナリ"]
                .iter()
                .map(|s| s.to_string())
                .collect()
        )
    );
}
