use pretty_assertions::assert_eq;

use msp430_rs::disasm::fmt_listing;
use msp430_rs::{disassemble, DisasmConfig, Follow, Line, WordStore};

fn render(dump: &str, cfg: DisasmConfig) -> String {
    let mut store = WordStore::from_dump(dump).unwrap();
    fmt_listing(&disassemble(&mut store, &cfg).unwrap())
}

#[test]
fn straight_line_record() {
    // 1056 is add with an indexed source, so 3041 is its extension word
    let cfg = DisasmConfig { start: Some(0x1000), ..Default::default() };
    let text = render("1000: 0412 1056 3041 2453\n", cfg);
    assert_eq!(
        text,
        "0x1000:\t0412\tpush r4\n\
         0x1002:\t1056 3041\tadd 0x4130(r6), pc\n\
         0x1006:\t2453\tadd #2, r4\n"
    );
}

#[test]
fn ret_word() {
    let text = render("1000: 0412 3041 2453\n", DisasmConfig::default());
    assert_eq!(
        text,
        "0x1000:\t0412\tpush r4\n\
         0x1002:\t3041\tret\n\
         0x1004:\t2453\tadd #2, r4\n"
    );
}

#[test]
fn elided_record_contributes_nothing() {
    let text = render("1000: 0412 3041\n1004:*\n1020: 3a41\n", DisasmConfig::default());
    assert_eq!(
        text,
        "0x1000:\t0412\tpush r4\n\
         0x1002:\t3041\tret\n\
         0x1020:\t3a41\tpop r10\n"
    );
}

#[test]
fn branch_to_distant_region_gets_separator() {
    let dump = "4400: 3140 0044 3040 1044\n4410: 0412 3041\n";
    assert_eq!(
        render(dump, DisasmConfig::default()),
        "0x4400:\t3140 0044\tmov #0x4400, sp\n\
         0x4404:\t3040 1044\tbr #0x4410\n\
         ...\n\
         0x4410:\t0412\tpush r4\n\
         0x4412:\t3041\tret\n"
    );
}

#[test]
fn branch_skips_dead_words() {
    // br #0x1008 jumps over two words that are never decoded
    let dump = "1000: 3040 0810 0000 0000 3041\n";
    assert_eq!(
        render(dump, DisasmConfig::default()),
        "0x1000:\t3040 0810\tbr #0x1008\n\
         ...\n\
         0x1008:\t3041\tret\n"
    );
    let linear = DisasmConfig { follow: Follow::empty(), ..Default::default() };
    assert_eq!(
        render(dump, linear),
        "0x1000:\t3040 0810\tbr #0x1008\n\
         0x1004:\t0000\tinvalid\n\
         0x1006:\t0000\tinvalid\n\
         0x1008:\t3041\tret\n"
    );
}

#[test]
fn start_offset_skips_earlier_records() {
    let dump = "1000: 0412 0412\n1010: 3041\n";
    let cfg = DisasmConfig { start: Some(0x1002), ..Default::default() };
    assert_eq!(render(dump, cfg), "0x1002:\t0412\tpush r4\n0x1010:\t3041\tret\n");
}

#[test]
fn misaligned_start_is_rejected() {
    let mut store = WordStore::from_dump("1000: 0412\n").unwrap();
    let cfg = DisasmConfig { start: Some(0x1001), ..Default::default() };
    assert!(disassemble(&mut store, &cfg).is_err());
}

#[test]
fn always_following_jmp_handles_loops() {
    // 0x1000: push r4 ; 0x1002: jmp 0x1000
    let cfg = DisasmConfig { follow: Follow::JMP, ..Default::default() };
    let mut store = WordStore::from_dump("1000: 0412 fe3f 3041\n").unwrap();
    let l = disassemble(&mut store, &cfg).unwrap();
    assert_eq!(l.lines.len(), 2);
    assert!(l.followed.is_empty());
}

#[test]
fn json_lines_are_tagged() {
    let mut store = WordStore::from_dump("1000: 3040 0050\n").unwrap();
    let l = disassemble(&mut store, &DisasmConfig::default()).unwrap();
    assert!(matches!(l.lines[0], Line::Insn(_)));
    let v = serde_json::to_value(&l).unwrap();
    assert_eq!(v["lines"][0]["kind"], "insn");
    assert_eq!(v["lines"][0]["mnemonic"], "br");
    assert_eq!(v["lines"][0]["flow"]["kind"], "branch");
    assert_eq!(v["lines"][0]["flow"]["target"], 0x5000);
    assert_eq!(v["unresolved"][0], 0x5000);
}

#[test]
fn operand_never_spans_elided_gap() {
    let text = render("1000: b012\n1002:*\n1040: 0044 3041\n", DisasmConfig::default());
    assert_eq!(
        text,
        "0x1000:\tb012\t.word 0x12b0\n\
         0x1040:\t0044\tmov r4, pc\n\
         0x1042:\t3041\tret\n"
    );
}

#[test]
fn operand_never_spans_address_gap() {
    let text = render("1000: 3140\n2000: 0044 3041\n", DisasmConfig::default());
    assert_eq!(
        text,
        "0x1000:\t3140\t.word 0x4031\n\
         0x2000:\t0044\tmov r4, pc\n\
         0x2002:\t3041\tret\n"
    );
}
