use super::*;

struct TestBus {
    memory: [u8; 0x10000],
}

impl Default for TestBus {
    fn default() -> Self {
        Self {
            memory: [0; 0x10000],
        }
    }
}

impl TestBus {
    fn load(&mut self, base: u16, bytes: &[u8]) {
        for (i, byte) in bytes.iter().enumerate() {
            self.memory[(base as usize + i) & 0xFFFF] = *byte;
        }
    }
}

impl Bus for TestBus {
    fn read8(&mut self, addr: u32) -> u8 {
        self.memory[(addr & 0xFFFF) as usize]
    }

    fn write8(&mut self, addr: u32, value: u8) {
        self.memory[(addr & 0xFFFF) as usize] = value;
    }

    fn peek8(&self, addr: u32) -> u8 {
        self.memory[(addr & 0xFFFF) as usize]
    }
}

/// CPU at PC 0 with `program` loaded at 0.
fn setup(program: &[u8]) -> (Cpu, TestBus) {
    let mut bus = TestBus::default();
    bus.load(0, program);
    (Cpu::new(), bus)
}

fn run(cpu: &mut Cpu, bus: &mut TestBus, steps: usize) {
    for _ in 0..steps {
        if let Err(err) = cpu.step(bus) {
            panic!("step at 0x{:04X} failed: {err}", cpu.pc);
        }
    }
}

fn flags(cpu: &Cpu) -> (bool, bool, bool, bool) {
    (cpu.ccr.z(), cpu.ccr.n(), cpu.ccr.c(), cpu.ccr.v())
}

#[test]
fn cpu_starts_cleared() {
    let cpu = Cpu::new();
    assert_eq!(cpu.pc, 0);
    assert_eq!(cpu.ccr.bits(), 0);
    assert_eq!(cpu.regs.snapshot(), [0; 8]);
}

#[test]
fn byte_views_alias_word_and_long_views() {
    let mut regs = Registers::default();
    for n in 0..8 {
        for value in 0..=0xFFu8 {
            regs.set_er(n, 0xAABB_CCDD);
            regs.set_rl(n, value);
            assert_eq!(regs.r(n) & 0xFF, value as u16);
            assert_eq!(regs.er(n), 0xAABB_CC00 | value as u32);

            regs.set_rh(n, value);
            assert_eq!(regs.r(n) >> 8, value as u16);
            assert_eq!(regs.er(n) & 0xFFFF_00FF, 0xAABB_0000 | value as u32);
        }
        regs.set_e(n, 0x1234);
        assert_eq!(regs.er(n) >> 16, 0x1234);
        assert_eq!(regs.e(n), 0x1234);
    }
}

#[test]
fn register_nibbles_select_views() {
    let mut regs = Registers::default();
    regs.set_reg8(0x9, 0x11); // r1l
    regs.set_reg8(0x1, 0x22); // r1h
    assert_eq!(regs.r(1), 0x2211);
    regs.set_reg16(0xA, 0xBEEF); // e2
    regs.set_reg16(0x2, 0xCAFE); // r2
    assert_eq!(regs.er(2), 0xBEEF_CAFE);
}

#[test]
fn add_flags_exhaustive_byte() {
    let mut cpu = Cpu::new();
    for a in 0..=0xFFu32 {
        for b in 0..=0xFFu32 {
            let result = cpu.alu_add(a, b, Size::Byte);
            assert_eq!(result, (a + b) & 0xFF);
            assert_eq!(cpu.ccr.z(), result == 0);
            assert_eq!(cpu.ccr.n(), result & 0x80 != 0);
            assert_eq!(cpu.ccr.c(), a + b > 0xFF);
            let same_sign = (a ^ b) & 0x80 == 0;
            assert_eq!(cpu.ccr.v(), same_sign && (result ^ a) & 0x80 != 0);
            assert_eq!(cpu.ccr.h(), (a & 0xF) + (b & 0xF) > 0xF);
        }
    }
}

#[test]
fn add_flags_sampled_wide() {
    let mut cpu = Cpu::new();
    let samples: [u32; 9] = [
        0,
        1,
        0x7F,
        0xFF,
        0x7FFF,
        0x8000,
        0xFFFF,
        0x7FFF_FFFF,
        0xFFFF_FFFF,
    ];
    for size in [Size::Word, Size::Long] {
        let mask = size.mask() as u64;
        for &a in &samples {
            for &b in &samples {
                let (a, b) = (a & size.mask(), b & size.mask());
                let result = cpu.alu_add(a, b, size);
                let full = a as u64 + b as u64;
                assert_eq!(result as u64, full & mask);
                assert_eq!(cpu.ccr.c(), full > mask, "{a:x}+{b:x} {size:?}");
                assert_eq!(cpu.ccr.z(), result == 0);
                let same_sign = (a ^ b) & size.sign_bit() == 0;
                assert_eq!(
                    cpu.ccr.v(),
                    same_sign && (result ^ a) & size.sign_bit() != 0
                );
            }
        }
    }
}

#[test]
fn sub_flags_exhaustive_byte() {
    let mut cpu = Cpu::new();
    for a in 0..=0xFFu32 {
        for b in 0..=0xFFu32 {
            let result = cpu.alu_sub(a, b, Size::Byte);
            assert_eq!(result, a.wrapping_sub(b) & 0xFF);
            assert_eq!(cpu.ccr.c(), b > a);
            assert_eq!(cpu.ccr.z(), a == b);
            assert_eq!(cpu.ccr.h(), (b & 0xF) > (a & 0xF));
            let (sa, sb) = (a as u8 as i8 as i32, b as u8 as i8 as i32);
            let exact = sa - sb;
            assert_eq!(cpu.ccr.v(), !(-128..=127).contains(&exact));
        }
    }
}

#[test]
fn sub_flags_sampled_long() {
    let mut cpu = Cpu::new();
    for (a, b) in [
        (0u32, 1u32),
        (1, 0),
        (0x8000_0000, 1),
        (0x7FFF_FFFF, 0xFFFF_FFFF),
        (5, 5),
    ] {
        cpu.alu_sub(a, b, Size::Long);
        assert_eq!(cpu.ccr.c(), b > a);
        assert_eq!(cpu.ccr.z(), a == b);
    }
    cpu.alu_sub(0x8000_0000, 1, Size::Long);
    assert!(cpu.ccr.v());
}

#[test]
fn mov_flags_keep_carry_and_half_carry() {
    for value in 0..=0xFFu8 {
        for preset in [Ccr::empty(), Ccr::C | Ccr::H | Ccr::V] {
            let (mut cpu, mut bus) = setup(&[0xF8, value]);
            cpu.ccr = preset;
            run(&mut cpu, &mut bus, 1);
            assert_eq!(cpu.regs.rl(0), value);
            assert!(!cpu.ccr.v());
            assert_eq!(cpu.ccr.z(), value == 0);
            assert_eq!(cpu.ccr.n(), value & 0x80 != 0);
            assert_eq!(cpu.ccr.c(), preset.contains(Ccr::C));
            assert_eq!(cpu.ccr.h(), preset.contains(Ccr::H));
        }
    }
}

#[test]
fn inc_dec_leave_carry_and_half_carry() {
    // inc.b r0l ; dec.w #2,r1
    let (mut cpu, mut bus) = setup(&[0x0A, 0x08, 0x1B, 0xD1]);
    cpu.regs.set_rl(0, 0x7F);
    cpu.regs.set_r(1, 0x0001);
    cpu.ccr = Ccr::C | Ccr::H;

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.rl(0), 0x80);
    assert!(cpu.ccr.v() && cpu.ccr.n() && cpu.ccr.c() && cpu.ccr.h());

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.r(1), 0xFFFF);
    assert!(cpu.ccr.n() && !cpu.ccr.v() && !cpu.ccr.z());
    assert!(cpu.ccr.c() && cpu.ccr.h());
}

#[test]
fn branch_predicates_match_table() {
    let expected: [fn(bool, bool, bool, bool) -> bool; 16] = [
        |_, _, _, _| true,
        |_, _, _, _| false,
        |z, _, _, c| !(c | z),
        |z, _, _, c| c | z,
        |_, _, _, c| !c,
        |_, _, _, c| c,
        |z, _, _, _| !z,
        |z, _, _, _| z,
        |_, _, v, _| !v,
        |_, _, v, _| v,
        |_, n, _, _| !n,
        |_, n, _, _| n,
        |_, n, v, _| !(n ^ v),
        |_, n, v, _| n ^ v,
        |z, n, v, _| !(z | (n ^ v)),
        |z, n, v, _| z | (n ^ v),
    ];
    for (index, cond) in Condition::ALL.iter().enumerate() {
        assert_eq!(Condition::from_nibble(index as u8), *cond);
        for bits in 0..16u8 {
            let (z, n, v, c) = (bits & 8 != 0, bits & 4 != 0, bits & 2 != 0, bits & 1 != 0);
            let mut ccr = Ccr::empty();
            ccr.set(Ccr::Z, z);
            ccr.set(Ccr::N, n);
            ccr.set(Ccr::V, v);
            ccr.set(Ccr::C, c);
            assert_eq!(
                cond.holds(ccr),
                expected[index](z, n, v, c),
                "{} with z={z} n={n} v={v} c={c}",
                cond.mnemonic()
            );
        }
    }
}

#[test]
fn add_immediate_twice() {
    // add.b #0x05,r0l ; add.b #0x03,r0l
    let (mut cpu, mut bus) = setup(&[0x88, 0x05, 0x88, 0x03]);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.regs.rl(0), 0x08);
    assert_eq!(flags(&cpu), (false, false, false, false));
    assert_eq!(cpu.pc, 4);
}

#[test]
fn bsr_then_rts_restores_pc_and_sp() {
    let mut bus = TestBus::default();
    // 0x0100: bsr 0x0104 ; 0x0102: nop ; 0x0104: rts
    bus.load(0x0100, &[0x55, 0x02, 0x00, 0x00, 0x54, 0x70]);
    let mut cpu = Cpu::new();
    cpu.pc = 0x0100;
    cpu.regs.set_sp(0xFF00);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.pc, 0x0104);
    assert_eq!(cpu.regs.sp(), 0xFEFE);
    assert_eq!(bus.memory[0xFEFE..0xFF00], [0x01, 0x02]);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.pc, 0x0102);
    assert_eq!(cpu.regs.sp(), 0xFF00);
}

#[test]
fn conditional_branch_taken_and_not_taken() {
    // cmp.b #0x01,r0l ; beq +2 ; nop ; nop
    let program = [0xA8, 0x01, 0x47, 0x02, 0x00, 0x00, 0x00, 0x00];
    let (mut cpu, mut bus) = setup(&program);
    cpu.regs.set_rl(0, 1);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.pc, 6);

    let (mut cpu, mut bus) = setup(&program);
    cpu.regs.set_rl(0, 2);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.pc, 4);
    assert_eq!(cpu.regs.rl(0), 2);
}

#[test]
fn long_branch_and_subroutine_forms() {
    let mut bus = TestBus::default();
    // 0x0000: bra/16 +0x0100 -> 0x0104
    bus.load(0, &[0x58, 0x00, 0x01, 0x00]);
    // 0x0104: jsr @@0x10 ; vector 0x0010 -> 0x0200
    bus.load(0x0104, &[0x5F, 0x10]);
    bus.load(0x0010, &[0x02, 0x00]);
    // 0x0200: rts
    bus.load(0x0200, &[0x54, 0x70]);
    let mut cpu = Cpu::new();
    cpu.regs.set_sp(0xFF00);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.pc, 0x0104);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.pc, 0x0200);
    assert_eq!(bus.memory[0xFEFE..0xFF00], [0x01, 0x06]);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.pc, 0x0106);
}

#[test]
fn jmp_through_register() {
    let (mut cpu, mut bus) = setup(&[0x59, 0x30]);
    cpu.regs.set_er(3, 0x0001_2345);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.pc, 0x2345);
}

#[test]
fn push_and_pop_long() {
    // push.l er3 ; pop.l er4
    let (mut cpu, mut bus) = setup(&[0x01, 0x00, 0x6D, 0xF3, 0x01, 0x00, 0x6D, 0x74]);
    cpu.regs.set_sp(0xFF00);
    cpu.regs.set_er(3, 0x1234_5678);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.sp(), 0xFEFC);
    assert_eq!(bus.memory[0xFEFC..0xFF00], [0x12, 0x34, 0x56, 0x78]);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.er(4), 0x1234_5678);
    assert_eq!(cpu.regs.sp(), 0xFF00);
}

#[test]
fn post_increment_steps_by_operand_width() {
    // mov.w @er1+,r0 ; mov.b @er1+,r2l
    let (mut cpu, mut bus) = setup(&[0x6D, 0x10, 0x6C, 0x1A]);
    bus.load(0x0400, &[0xAB, 0xCD, 0xEF]);
    cpu.regs.set_er(1, 0x0400);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.regs.r(0), 0xABCD);
    assert_eq!(cpu.regs.rl(2), 0xEF);
    assert_eq!(cpu.regs.er(1), 0x0403);
}

#[test]
fn displacement_is_sign_extended() {
    // mov.b @(-1,er1),r0l
    let (mut cpu, mut bus) = setup(&[0x6E, 0x18, 0xFF, 0xFF]);
    bus.load(0x04FF, &[0x42]);
    cpu.regs.set_er(1, 0x0500);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.rl(0), 0x42);
}

#[test]
fn short_absolute_uses_upper_page() {
    // mov.b @0x80:8,r0l ; mov.b r0l,@0x81:8
    let (mut cpu, mut bus) = setup(&[0x28, 0x80, 0x38, 0x81]);
    bus.load(0xFF80, &[0x5A]);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.regs.rl(0), 0x5A);
    assert_eq!(bus.memory[0xFF81], 0x5A);
}

#[test]
fn addresses_wrap_at_64k() {
    // mov.w r0,@0xffff:16 ; mov.w r1,@0x01fffe:24
    let program = [
        0x6B, 0x80, 0xFF, 0xFF, 0x6B, 0xA1, 0x00, 0x01, 0xFF, 0xFE,
    ];
    let mut bus = TestBus::default();
    bus.load(0x0100, &program);
    let mut cpu = Cpu::new();
    cpu.pc = 0x0100;
    cpu.regs.set_r(0, 0x1234);
    cpu.regs.set_er(1, 0xA1A2_A3A4);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(bus.memory[0xFFFF], 0x12);
    assert_eq!(bus.memory[0x0000], 0x34);

    let insn = cpu.fetch_decode(&bus, cpu.pc).unwrap();
    assert_eq!(insn.size, Size::Word);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(bus.memory[0xFFFE..], [0xA3, 0xA4]);
}

#[test]
fn shifts_and_rotates() {
    // shal.b r0l ; shar.b r1l ; rotxl.b r2l ; rotr.w r3
    let (mut cpu, mut bus) = setup(&[0x10, 0x88, 0x11, 0x89, 0x12, 0x0A, 0x13, 0x93]);
    cpu.regs.set_rl(0, 0x40);
    cpu.regs.set_rl(1, 0x81);
    cpu.regs.set_rl(2, 0x80);
    cpu.regs.set_r(3, 0x0001);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.rl(0), 0x80);
    assert!(!cpu.ccr.c() && cpu.ccr.v() && cpu.ccr.n());

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.rl(1), 0xC0);
    assert!(cpu.ccr.c() && !cpu.ccr.v());

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.rl(2), 0x01);
    assert!(cpu.ccr.c());

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.r(3), 0x8000);
    assert!(cpu.ccr.c() && cpu.ccr.n());
}

#[test]
fn rotate_through_carry_uses_previous_carry() {
    let mut cpu = Cpu::new();
    cpu.ccr = Ccr::C;
    assert_eq!(cpu.alu_shift(Shift::Rotxr, 0x02, Size::Byte), 0x81);
    assert!(!cpu.ccr.c());
    assert_eq!(cpu.alu_shift(Shift::Rotxr, 0x01, Size::Byte), 0x00);
    assert!(cpu.ccr.c() && cpu.ccr.z());
    assert_eq!(cpu.alu_shift(Shift::Shlr, 0x8000_0001, Size::Long), 0x4000_0000);
    assert!(cpu.ccr.c());
}

#[test]
fn addx_only_clears_zero() {
    // addx #0x00,r0l
    let (mut cpu, mut bus) = setup(&[0x98, 0x00, 0x98, 0x01]);
    cpu.ccr = Ccr::Z;
    run(&mut cpu, &mut bus, 1);
    assert!(cpu.ccr.z());
    run(&mut cpu, &mut bus, 1);
    assert!(!cpu.ccr.z());
    assert_eq!(cpu.regs.rl(0), 0x01);
}

#[test]
fn subx_borrows_carry() {
    // subx #0x01,r0l with C set: 0x05 - 0x01 - 1
    let (mut cpu, mut bus) = setup(&[0xB8, 0x01]);
    cpu.regs.set_rl(0, 0x05);
    cpu.ccr = Ccr::C;
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.rl(0), 0x03);
    assert!(!cpu.ccr.c());
}

#[test]
fn long_arithmetic_and_compare() {
    // add.l #0x00000001,er0 ; sub.l er0,er1 ; cmp.l er0,er0
    let (mut cpu, mut bus) = setup(&[
        0x7A, 0x10, 0x00, 0x00, 0x00, 0x01, 0x1A, 0x81, 0x1F, 0x80,
    ]);
    cpu.regs.set_er(0, 0x0000_FFFF);
    cpu.regs.set_er(1, 0x0000_0001);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.er(0), 0x0001_0000);
    assert!(cpu.ccr.h() && !cpu.ccr.c());
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.er(1), 0xFFFF_0001);
    assert!(cpu.ccr.c() && cpu.ccr.n());
    run(&mut cpu, &mut bus, 1);
    assert!(cpu.ccr.z() && !cpu.ccr.c());
    assert_eq!(cpu.regs.er(0), 0x0001_0000);
}

#[test]
fn adds_and_subs_touch_no_flags() {
    let (mut cpu, mut bus) = setup(&[0x0B, 0x97, 0x1B, 0x87]);
    cpu.regs.set_sp(0xFFFF_FFFE);
    cpu.ccr = Ccr::Z;
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.sp(), 0x0000_0002);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.sp(), 0x0000_0000);
    assert_eq!(cpu.ccr, Ccr::Z);
}

#[test]
fn neg_and_not() {
    // neg.b r0l ; not.w r1
    let (mut cpu, mut bus) = setup(&[0x17, 0x88, 0x17, 0x11]);
    cpu.regs.set_rl(0, 0x01);
    cpu.regs.set_r(1, 0x00FF);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.rl(0), 0xFF);
    assert!(cpu.ccr.c() && cpu.ccr.n());
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.r(1), 0xFF00);
    assert!(!cpu.ccr.v());
}

#[test]
fn extend_register() {
    // exts.w r0 ; extu.l er1
    let (mut cpu, mut bus) = setup(&[0x17, 0xD0, 0x17, 0x71]);
    cpu.regs.set_r(0, 0x1280);
    cpu.regs.set_er(1, 0xFFFF_8001);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.regs.r(0), 0xFF80);
    assert_eq!(cpu.regs.er(1), 0x0000_8001);
    assert!(!cpu.ccr.n());
}

#[test]
fn unsigned_multiply_and_divide() {
    // mulxu.b r1l,r0 ; divxu.b r1l,r2
    let (mut cpu, mut bus) = setup(&[0x50, 0x90, 0x51, 0x92]);
    cpu.regs.set_rl(1, 0x10);
    cpu.regs.set_r(0, 0xFF20);
    cpu.regs.set_r(2, 0x0203);
    cpu.ccr = Ccr::C;
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.r(0), 0x0200);
    assert_eq!(cpu.ccr, Ccr::C);
    run(&mut cpu, &mut bus, 1);
    // quotient 0x20, remainder 0x03
    assert_eq!(cpu.regs.r(2), 0x0320);
    assert!(!cpu.ccr.z() && !cpu.ccr.n());
}

#[test]
fn divide_by_zero_keeps_destination() {
    // divxu.w r1,er2
    let (mut cpu, mut bus) = setup(&[0x53, 0x12]);
    cpu.regs.set_er(2, 0x1234_5678);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.er(2), 0x1234_5678);
    assert!(cpu.ccr.z());
}

#[test]
fn signed_multiply_and_divide() {
    // mulxs.b r1l,r0 ; divxs.b r1l,r2
    let (mut cpu, mut bus) = setup(&[0x01, 0xC0, 0x50, 0x90, 0x01, 0xD0, 0x51, 0x92]);
    cpu.regs.set_r(0, 0x00FE);
    cpu.regs.set_rl(1, 0x03);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.r(0), 0xFFFA);
    assert!(cpu.ccr.n() && !cpu.ccr.z());

    cpu.regs.set_rl(1, 0x02);
    cpu.regs.set_r(2, (-7i16) as u16);
    run(&mut cpu, &mut bus, 1);
    // quotient -3, remainder -1
    assert_eq!(cpu.regs.r(2), 0xFFFD);
    assert!(cpu.ccr.n());
}

#[test]
fn decimal_adjust_after_add() {
    // add.b #0x01,r0l ; daa r0l
    let (mut cpu, mut bus) = setup(&[0x88, 0x01, 0x0F, 0x08]);
    cpu.regs.set_rl(0, 0x09);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.regs.rl(0), 0x10);
    assert!(!cpu.ccr.c());

    let (mut cpu, mut bus) = setup(&[0x88, 0x01, 0x0F, 0x08]);
    cpu.regs.set_rl(0, 0x99);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.regs.rl(0), 0x00);
    assert!(cpu.ccr.c() && cpu.ccr.z());
}

#[test]
fn logic_operations() {
    // and.b #0x0f,r0l ; or.w r1,r2 ; xor.l er3,er4
    let (mut cpu, mut bus) = setup(&[
        0xE8, 0x0F, 0x64, 0x12, 0x01, 0xF0, 0x65, 0x34,
    ]);
    cpu.regs.set_rl(0, 0xF0);
    cpu.regs.set_r(1, 0x8000);
    cpu.regs.set_r(2, 0x0001);
    cpu.regs.set_er(3, 0xFFFF_FFFF);
    cpu.regs.set_er(4, 0xFFFF_FFFF);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.rl(0), 0);
    assert!(cpu.ccr.z());
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.r(2), 0x8001);
    assert!(cpu.ccr.n());
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.er(4), 0);
    assert!(cpu.ccr.z());
}

#[test]
fn bit_operations_on_registers_and_memory() {
    let program = [
        0x70, 0x38, // bset #3,r0l
        0x73, 0x38, // btst #3,r0l
        0x77, 0x08, // bld #0,r0l
        0x67, 0x18, // bst #1,r0l
        0x7F, 0x80, 0x72, 0x70, // bclr #7,@0x80:8
        0x7E, 0x80, 0x75, 0x00, // bxor #0,@0x80:8
    ];
    let (mut cpu, mut bus) = setup(&program);
    bus.load(0xFF80, &[0x81]);
    cpu.ccr = Ccr::C;

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.rl(0), 0x08);
    run(&mut cpu, &mut bus, 1);
    assert!(!cpu.ccr.z());
    run(&mut cpu, &mut bus, 1);
    assert!(!cpu.ccr.c());
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.rl(0), 0x08);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(bus.memory[0xFF80], 0x01);
    run(&mut cpu, &mut bus, 1);
    assert!(cpu.ccr.c());
}

#[test]
fn block_move() {
    // eepmov.b
    let (mut cpu, mut bus) = setup(&[0x7B, 0x5C, 0x59, 0x8F]);
    bus.load(0x0400, b"abc");
    cpu.regs.set_er(5, 0x0400);
    cpu.regs.set_er(6, 0x0500);
    cpu.regs.set_rl(4, 3);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(&bus.memory[0x0500..0x0503], b"abc");
    assert_eq!(cpu.regs.er(5), 0x0403);
    assert_eq!(cpu.regs.er(6), 0x0503);
    assert_eq!(cpu.regs.rl(4), 0);
}

#[test]
fn ccr_transfers() {
    // ldc #0x85,ccr ; stc ccr,r0l ; andc #0x7f,ccr ; stc.w ccr,@-er7
    let (mut cpu, mut bus) = setup(&[
        0x07, 0x85, 0x02, 0x08, 0x06, 0x7F, 0x01, 0x40, 0x6D, 0xF0,
    ]);
    cpu.regs.set_sp(0xFF00);
    run(&mut cpu, &mut bus, 1);
    assert!(cpu.ccr.contains(Ccr::I | Ccr::Z | Ccr::C));
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.rl(0), 0x85);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.ccr.bits(), 0x05);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.regs.sp(), 0xFEFE);
    assert_eq!(bus.memory[0xFEFE], 0x05);
}

#[test]
fn sleep_halts_the_core() {
    let (mut cpu, mut bus) = setup(&[0x01, 0x80]);
    run(&mut cpu, &mut bus, 1);
    assert!(cpu.sleeping);
    assert_eq!(cpu.pc, 2);
}

#[test]
fn undefined_word_is_reported_without_side_effects() {
    let (mut cpu, mut bus) = setup(&[0x00, 0x01]);
    cpu.regs.set_er(0, 0x55);
    let err = cpu.step(&mut bus).unwrap_err();
    assert_eq!(
        err,
        CpuError::Decode {
            pc: 0,
            source: DecodeError::Undefined { word: 0x0001 },
        }
    );
    assert_eq!(cpu.pc, 0);
    assert_eq!(cpu.regs.er(0), 0x55);
}

#[test]
fn rte_and_trapa_are_unimplemented() {
    let (mut cpu, mut bus) = setup(&[0x56, 0x70]);
    assert_eq!(
        cpu.step(&mut bus),
        Err(CpuError::Unimplemented {
            pc: 0,
            mnemonic: "rte"
        })
    );

    let (mut cpu, mut bus) = setup(&[0x57, 0x20]);
    assert!(matches!(
        cpu.step(&mut bus),
        Err(CpuError::Unimplemented {
            mnemonic: "trapa",
            ..
        })
    ));
}

#[test]
fn legacy_memory_xor_decode() {
    // bxor #0,@0x80:8 decodes as bixor in the legacy mode
    let mut bus = TestBus::default();
    bus.load(0, &[0x7E, 0x80, 0x75, 0x00]);
    let cpu = Cpu::with_config(CpuConfig {
        memory_bit_xor_swapped: true,
    });
    assert_eq!(cpu.fetch_decode(&bus, 0).unwrap().op, Op::Bixor);
    assert_eq!(Cpu::new().fetch_decode(&bus, 0).unwrap().op, Op::Bxor);
}

#[test]
fn reset_keeps_configuration() {
    let mut cpu = Cpu::with_config(CpuConfig {
        memory_bit_xor_swapped: true,
    });
    cpu.pc = 0x1234;
    cpu.regs.set_er(1, 7);
    cpu.reset();
    assert_eq!(cpu.pc, 0);
    assert_eq!(cpu.regs.er(1), 0);
    assert!(cpu.config().memory_bit_xor_swapped);
}

#[test]
fn write_log_holds_only_the_last_instruction() {
    // mov.b #0x12,r0l; mov.b r0l,@0x80:8; mov.w r0,@0xff82:16; nop
    let mut bus = MemoryBus::new();
    bus.load(
        0,
        &[0xF8, 0x12, 0x38, 0x80, 0x6B, 0x80, 0xFF, 0x82, 0x00, 0x00],
    );
    let mut cpu = Cpu::new();

    cpu.step(&mut bus).unwrap();
    assert!(bus.writes().is_empty());

    cpu.step(&mut bus).unwrap();
    assert_eq!(bus.writes(), &[(0xFF80, 0x12)]);

    cpu.step(&mut bus).unwrap();
    assert_eq!(bus.writes(), &[(0xFF82, 0x00), (0xFF83, 0x12)]);

    cpu.step(&mut bus).unwrap();
    assert!(bus.writes().is_empty());
}
