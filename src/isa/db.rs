use crate::cpu::Cpus;
use crate::flags;
use crate::instructions::AddrMode::*;
use crate::instructions::{DeclaredCycles, Instruction, InstructionGroup, Modes, Variant};

const BRANCH_NOTE: &str =
    "HuC6280: 256-byte and 8192-byte page-boundary crossing do not incur cycle penalties";

/// Eight variants of a `#n` family, one per bit; opcodes step by 0x10.
fn per_bit(cpus: Cpus, base: u8, bytes: u8, cycles: impl Into<DeclaredCycles>, modes: impl Into<Modes>) -> Vec<Variant> {
    let cycles = cycles.into();
    let modes = modes.into();
    (0..8u8)
        .map(|n| Variant::new(cpus, base + n * 0x10, bytes, cycles.clone(), modes.clone()).fill(n))
        .collect()
}

/// Immediate, zero page (plain, X, indirect, X indirect, indirect Y) and absolute (plain, X, Y).
fn accumulator_variants(op: [u8; 9]) -> Vec<Variant> {
    vec![
        Variant::new(Cpus::FAMILY, op[0], 2, 2, Immediate),
        Variant::new(Cpus::FAMILY, op[1], 2, 4, ZeroPage),
        Variant::new(Cpus::FAMILY, op[2], 2, 4, ZeroPage | XIndexed),
        Variant::new(Cpus::CMOS, op[3], 2, 7, ZeroPage | Indirect),
        Variant::new(Cpus::FAMILY, op[4], 2, 7, ZeroPage | XIndexed | Indirect),
        Variant::new(Cpus::FAMILY, op[5], 2, 7, ZeroPage | Indirect | YIndexed),
        Variant::new(Cpus::FAMILY, op[6], 3, 5, Absolute),
        Variant::new(Cpus::FAMILY, op[7], 3, 5, Absolute | XIndexed),
        Variant::new(Cpus::FAMILY, op[8], 3, 5, Absolute | YIndexed),
    ]
}

fn branching() -> InstructionGroup {
    InstructionGroup::new(
        "Branching Operations",
        vec![
            Instruction::new("BRA", "_B_ranch _Always")
                .abstract_text("PC = PC + 2 + REL")
                .description("A branch is always taken; no testing is done. A one-byte signed displacement, fetched from the second byte of the instruction, is added to the program counter. The allowable range of the displacement is -128 to +127 from the instruction immediately following the branch.")
                .summary("Unconditionally branch to the address calculated from the operand. The operand is treated as an 8-bit signed number, -128 to 127.")
                .note(BRANCH_NOTE)
                .variant(Variant::new(Cpus::CMOS, 0x80, 2, 4, Relative))
                .flags(flags![-, -, 0, -, -, -, -, -]),
            Instruction::new("JMP", "_Ju_m_p")
                .description("Transfer control to the address specified by the operand field. The program counter is loaded with the target address.")
                .summary("Transfers control (sets the program counter) to the effective address calculated from the operand.")
                .variant(Variant::new(Cpus::FAMILY, 0x4C, 3, 4, Absolute).abstract_text("PCL = $ll\nPCH = $hh"))
                .variant(
                    Variant::new(Cpus::FAMILY, 0x6C, 3, 7, Absolute | Indirect)
                        .abstract_text("PCL = [$hhll]\nPCH = [$hhll + 1]"),
                )
                .variant(
                    Variant::new(Cpus::CMOS, 0x7C, 3, 7, Absolute | XIndexed | Indirect)
                        .abstract_text("PCL = [$hhll + X]\nPCH = [$hhll + X + 1]"),
                )
                .flags(flags![-, -, 0, -, -, -, -, -]),
            Instruction::new("BVS", "_Branch on O_verflow _Set")
                .abstract_text("If V == 1: PC = PC + 2 + REL\nElse: PC = PC + 2")
                .description("The overflow flag V in the status register is tested. If it is set, a branch is taken; if it is clear, the instruction immediately following the two-byte BVS instruction is executed. BVS is almost exclusively used to check that a two's complement arithmetic calculation has overflowed.")
                .summary("If the Overflow Flag is 1, branch to the address calculated from the operand.")
                .note(BRANCH_NOTE)
                .variant(Variant::new(Cpus::FAMILY, 0x70, 2, "2 (4 if branch taken)", Relative))
                .flags(flags![-, -, 0, -, -, -, -, -]),
            Instruction::new("BBR#", "_Branch on _Bit _Reset _#n")
                .abstract_text("If MEM#n == 0: PC = PC + 3 + REL\nElse: PC = PC + 3")
                .description("The selected bit of the zero page memory location is tested. If it is clear, a branch is taken; if it is set, the instruction immediately following the three-byte instruction is executed.")
                .summary("If Bit #n of the value at the effective address specified by the first operand is clear, branch to the address calculated from the second operand.")
                .note(BRANCH_NOTE)
                .variants(per_bit(Cpus::CMOS, 0x0F, 3, "6 (8 if branch taken)", ZeroPage | Secondary | Relative))
                .flags(flags![-, -, 0, -, -, -, -, -]),
            Instruction::new("BBS#", "_Branch on _Bit _Set _#n")
                .abstract_text("If MEM#n == 1: PC = PC + 3 + REL\nElse: PC = PC + 3")
                .description("The selected bit of the zero page memory location is tested. If it is set, a branch is taken; if it is clear, the instruction immediately following the three-byte instruction is executed.")
                .summary("If Bit #n of the value at the effective address specified by the first operand is set, branch to the address calculated from the second operand.")
                .note(BRANCH_NOTE)
                .variants(per_bit(Cpus::CMOS, 0x8F, 3, "6 (8 if branch taken)", ZeroPage | Secondary | Relative))
                .flags(flags![-, -, 0, -, -, -, -, -]),
        ],
    )
}

fn subroutine() -> InstructionGroup {
    InstructionGroup::new(
        "Subroutine Operations",
        vec![
            Instruction::new("BSR", "_Branch to _Sub_routine")
                .abstract_text("PC = PC + 1\n[SP] = PCH ;\tSP = SP - 1\n[SP] = PCL ;\tSP = SP - 1\nPC = PC + 2 + REL")
                .description("Similar to JSR, but the subroutine offset is a relative displacement instead of an absolute address. The current program counter is pushed onto the stack before the branch.")
                .summary("The program counter (last byte of the BSR instruction) is pushed to stack and the CPU branches to the specified relative address.")
                .note(BRANCH_NOTE)
                .variant(Variant::new(Cpus::HUC6280, 0x44, 2, 8, Relative))
                .flags(flags![-, -, 0, -, -, -, -, -]),
            Instruction::new("JSR", "_Jump to _Sub_routine")
                .abstract_text("PC = PC + 2\n[SP] = PCH ;\tSP = SP - 1\n[SP] = PCL ;\tSP = SP - 1\nPC = $hhll")
                .description("Transfer control to the subroutine at the location specified by the operand, after first pushing the current program counter value onto the stack as a return address.")
                .summary("Push the Program Counter onto the stack and set it to the address specified in the operand.")
                .variant(Variant::new(Cpus::FAMILY, 0x20, 3, 7, Absolute))
                .flags(flags![-, -, 0, -, -, -, -, -]),
            Instruction::new("RTS", "_Re_turn from _Subroutine")
                .abstract_text("SP = SP + 1 ;\tPCL = [SP]\nSP = SP + 1 ;\tPCH = [SP]\nPC = PC + 1")
                .description("Pull the program counter from the stack, incrementing the 16-bit value by one before loading the program counter with it. The low byte is pulled first, followed by the high byte.")
                .variant(Variant::new(Cpus::FAMILY, 0x60, 1, 7, Implied))
                .flags(flags![-, -, 0, -, -, -, -, -]),
        ],
    )
}

fn interrupt() -> InstructionGroup {
    InstructionGroup::new(
        "Interrupt Operations",
        vec![
            Instruction::new("BRK", "_B_rea_k")
                .abstract_text("PC = PC + 2\n[SP] = PCH ;\tSP = SP - 1\n[SP] = PCL ;\tSP = SP - 1\n[SP] = P ;\tSP = SP - 1\nPCL = [$FFF6]\nPCH = [$FFF7]")
                .description("Forces a software interrupt. The program counter is incremented by two and pushed onto the stack, followed by the status register P. The program counter is then loaded with the break vector. The decimal flag D is cleared and the I flag is set.")
                .summary("Forces a software interrupt using IRQ2's vector. Contrary to IRQs, BRK pushes the status flags register with the B flag set.")
                .variant(Variant::new(Cpus::FAMILY, 0x00, 1, 8, Implied))
                .flags(flags![-, -, 0, 1, 0, 1, -, -]),
            Instruction::new("RTI", "_Re_turn from _Interrupt")
                .abstract_text("SP = SP + 1 ;\tP = [SP]\nSP = SP + 1 ;\tPCL = [SP]\nSP = SP + 1 ;\tPCH = [SP]")
                .description("Pull the status register and the program counter from the stack in order. Normally used to return from an interrupt call such as BRK.")
                .variant(Variant::new(Cpus::FAMILY, 0x40, 1, 7, Implied))
                .flags(flags!["[SP]:7", "[SP]:6", "[SP]:5", "[SP]:4", "[SP]:3", "[SP]:2", "[SP]:1", "[SP]:0"]),
        ],
    )
}

fn data_transfer() -> InstructionGroup {
    InstructionGroup::new(
        "Data Transfer Operations",
        vec![
            Instruction::new("LDA", "_Loa_d _Accumulator")
                .abstract_text("A = MEM")
                .description("Load the accumulator with the data located at the effective address specified by the operand.")
                .variants(accumulator_variants([0xA9, 0xA5, 0xB5, 0xB2, 0xA1, 0xB1, 0xAD, 0xBD, 0xB9]))
                .flags(flags!["MEM:7", -, 0, -, -, -, "MEM == 0", -]),
            Instruction::new("ST0", "_S_tore HuC6270 _0")
                .abstract_text("[$001FE000] = IMM")
                .description("The immediate argument is stored in the HuC6270's address register. This command is equivalent to storing the immediate argument in $1FE000.")
                .variant(Variant::new(Cpus::HUC6280, 0x03, 2, 5, Immediate | Implied))
                .flags(flags![-, -, 0, -, -, -, -, -]),
            Instruction::new("STZ", "_S_tore _Zero")
                .abstract_text("MEM = $00")
                .description("Store the value 0x00 to the effective address specified by the operand. Very useful for initialising memory.")
                .variant(Variant::new(Cpus::CMOS, 0x64, 2, 4, ZeroPage))
                .variant(Variant::new(Cpus::CMOS, 0x74, 2, 4, ZeroPage | XIndexed))
                .variant(Variant::new(Cpus::CMOS, 0x9C, 3, 5, Absolute))
                .variant(Variant::new(Cpus::CMOS, 0x9E, 3, 5, Absolute | XIndexed))
                .flags(flags![-, -, 0, -, -, -, -, -]),
        ],
    )
}

fn mass_transfer() -> InstructionGroup {
    InstructionGroup::new(
        "Mass Transfer Operations",
        vec![
            Instruction::new("TII", "_Transfer _Increment _Increment")
                .description("Execute a memory move where the source and destination addresses increment with each loop cycle. Blocks interrupts from happening until finished. A/X/Y are pushed onto the stack during the transfer.")
                .variant(Variant::untimed(Cpus::HUC6280, 0x73, 7, Block))
                .flags(flags![-, -, 0, -, -, -, -, -]),
            Instruction::new("TDD", "_Transfer _Decrement _Decrement")
                .description("Execute a memory move where the source and destination addresses decrement with each loop cycle. Blocks interrupts from happening until finished. A/X/Y are pushed onto the stack during the transfer.")
                .variant(Variant::untimed(Cpus::HUC6280, 0xC3, 7, Block))
                .flags(flags![-, -, 0, -, -, -, -, -]),
        ],
    )
}

fn status_flags() -> InstructionGroup {
    InstructionGroup::new(
        "Status Flag Operations",
        vec![
            Instruction::new("CLC", "_C_lear _Carry Flag")
                .abstract_text("C = 0")
                .description("The carry flag C in the status register is set to 0.")
                .summary("Resets the Carry Flag, known also as C and P0, to 0.")
                .note("The Carry Flag is also known as C and P0.")
                .variant(Variant::new(Cpus::FAMILY, 0x18, 1, 2, Implied))
                .flags(flags![-, -, 0, -, -, -, -, 0]),
            Instruction::new("SET", "_S_et Memory _Transfer Flag")
                .abstract_text("T = 1")
                .description("The T flag in the status register is set to 1. While it is set, the instructions that normally use the A register operate on the zero page location pointed to by the X register instead.")
                .summary("Sets the Memory Transfer Flag to 1.")
                .note("The Memory Transfer Flag is also known as T and P5.\nThis instruction should only be used immediately before ADC, SBC, AND, ORA, or EOR.")
                .variant(Variant::new(Cpus::HUC6280, 0xF4, 1, 2, Implied))
                .flags(flags![-, -, 1, -, -, -, -, -]),
        ],
    )
}

fn bit_operations() -> InstructionGroup {
    InstructionGroup::new(
        "Bit Operations",
        vec![
            Instruction::new("SMB#", "_Set _Memory _Bit _#n")
                .abstract_text("MEM#n = 1")
                .description("Set the specified bit in the zero page memory location specified in the operand. The bit is selected by a number concatenated to the end of the mnemonic, resulting in 8 distinct opcodes.")
                .summary("Reads the zero-page address specified by the operand, sets the bit #n, and then writes it back to the aforementioned address.")
                .variants(per_bit(Cpus::CMOS, 0x87, 2, 7, ZeroPage))
                .flags(flags![-, -, 0, -, -, -, -, -]),
            Instruction::new("RMB#", "_Reset _Memory _Bit _#n")
                .abstract_text("MEM#n = 0")
                .description("Clear the specified bit in the zero page memory location specified in the operand. The bit is selected by a number concatenated to the end of the mnemonic, resulting in 8 distinct opcodes.")
                .summary("Reads the zero-page address specified by the operand, resets (clears) the bit #n, and then writes it back to the aforementioned address.")
                .variants(per_bit(Cpus::CMOS, 0x07, 2, 7, ZeroPage))
                .flags(flags![-, -, 0, -, -, -, -, -]),
        ],
    )
}

fn stack() -> InstructionGroup {
    InstructionGroup::new(
        "Stack Operations",
        vec![
            Instruction::new("PHA", "_Pus_h _Accumulator")
                .abstract_text("SP = SP + 1 ;\t[SP] = A")
                .description("Push the accumulator onto the stack.")
                .variant(Variant::new(Cpus::FAMILY, 0x48, 1, 3, Implied))
                .flags(flags![-, -, 0, -, -, -, -, -]),
            Instruction::new("PHP", "_Pus_h _Processor Status Register")
                .abstract_text("SP = SP + 1 ;\t[SP] = P")
                .description("Push the processor status register P onto the stack.")
                .variant(Variant::new(Cpus::FAMILY, 0x08, 1, 3, Implied))
                .flags(flags![-, -, 0, -, -, -, -, -]),
        ],
    )
}

fn alu() -> InstructionGroup {
    InstructionGroup::new(
        "ALU Operations",
        vec![
            Instruction::new("ADC", "_A_dd With _Carry")
                .abstract_text("If T == 0: A = A + MEM\nElse: MEM = A + MEM")
                .description("Add the data located at the effective address specified by the operand to the contents of the accumulator. Add one to the result if the carry flag is set, and store the final result in the accumulator. This opcode takes one extra cycle to complete if the decimal mode flag D is set.")
                .summary("Add the value specified by the operand, and 1 if the Carry Flag is set, to the value in the accumulator.")
                .note("If T=1 (the previous instruction is SET) the zero-page byte specified by the X register is used instead of the A register.")
                .variants(accumulator_variants([0x69, 0x65, 0x75, 0x72, 0x61, 0x71, 0x6D, 0x7D, 0x79]))
                .flags(flags!["A + MEM > 127", "signed overflow", 0, -, -, -, "(A == 0) && (MEM == 0)", "C"]),
            Instruction::new("ORA", "Bitwise _O_R _Accumulator")
                .abstract_text("If T == 0: A = A | MEM\nElse: MEM = A | MEM")
                .description("Bitwise OR the data located at the effective address specified by the operand with the contents of the accumulator. Each bit in the accumulator is ORed with the corresponding bit in memory.")
                .variants(accumulator_variants([0x09, 0x05, 0x15, 0x12, 0x01, 0x11, 0x0D, 0x1D, 0x19]))
                .flags(flags!["A:7 | MEM:7", -, 0, -, -, -, "A | MEM == 0", -]),
        ],
    )
}

fn shift() -> InstructionGroup {
    InstructionGroup::new(
        "Bitwise Shift Operations",
        vec![Instruction::new("ASL", "_Arithmetic _Left _Shift")
            .abstract_text("C = MEM:7\nMEM = MEM << 1")
            .description("Shift the contents of the location specified by the operand left one bit. Bit 7 is transferred into the carry flag and bit 0 is cleared. The arithmetic result of the operation is an unsigned multiplication by two.")
            .summary("Shifts the value at the location specified by the operand left by one bit, shifting in 0 to bit 0, and writes the result back to that location.")
            .variant(Variant::new(Cpus::FAMILY, 0x06, 2, 6, ZeroPage))
            .variant(Variant::new(Cpus::FAMILY, 0x16, 2, 6, ZeroPage | XIndexed))
            .variant(Variant::new(Cpus::FAMILY, 0x0E, 3, 7, Absolute))
            .variant(Variant::new(Cpus::FAMILY, 0x1E, 3, 7, Absolute | XIndexed))
            .variant(Variant::new(Cpus::FAMILY, 0x0A, 1, 2, Accumulator))
            .flags(flags!["MEM:6", -, 0, -, -, -, "MEM & 0b01111111 == 0", "MEM:7"])],
    )
}

fn bit_testing() -> InstructionGroup {
    InstructionGroup::new(
        "Bit Testing Operations",
        vec![Instruction::new("TST", "_Te_s_t Memory Bits")
            .abstract_text("IMM & MEM (result discarded)")
            .description("Logically AND together the immediate operand with the data at the effective address specified by the second operand. N and V and Z are set as in the BIT instruction.")
            .variant(Variant::new(Cpus::HUC6280, 0x83, 3, 7, Immediate | Secondary | ZeroPage))
            .variant(Variant::new(Cpus::HUC6280, 0xA3, 3, 7, Immediate | Secondary | ZeroPage | XIndexed))
            .variant(Variant::new(Cpus::HUC6280, 0x93, 4, 8, Immediate | Secondary | Absolute))
            .variant(Variant::new(Cpus::HUC6280, 0xB3, 4, 8, Immediate | Secondary | Absolute | XIndexed))
            .flags(flags!["MEM:7", "MEM:6", 0, -, -, -, "$nn & MEM == 0", -])],
    )
}

fn miscellaneous() -> InstructionGroup {
    InstructionGroup::new(
        "Miscellaneous Operations",
        vec![
            Instruction::new("NOP", "_No _O_peration")
                .abstract_text("PC = PC + 1")
                .description("NOP performs no action, and is often used for timing loops or temporarily removing certain instructions.")
                .variant(Variant::new(Cpus::FAMILY, 0xEA, 1, 2, Implied))
                .flags(flags![-, -, 0, -, -, -, -, -]),
            Instruction::new("CSL", "_Change _Speed _Low")
                .abstract_text("Run CPU at 25% speed (1.7897725 MHz)")
                .description("Sets the HuC6280 to low speed. Needed for accessing slow memory such as BRAM.")
                .variant(Variant::new(Cpus::HUC6280, 0x54, 1, 3, Implied))
                .flags(flags![-, -, 0, -, -, -, -, -]),
        ],
    )
}

/// The authored instruction set, grouped by operation class in page order.
pub fn database() -> Vec<InstructionGroup> {
    vec![
        branching(),
        subroutine(),
        interrupt(),
        data_transfer(),
        mass_transfer(),
        status_flags(),
        bit_operations(),
        stack(),
        alu(),
        shift(),
        bit_testing(),
        miscellaneous(),
    ]
}
