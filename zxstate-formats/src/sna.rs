/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of ZXSTATE, a Rust library for ZX Spectrum machine state.

    For the full copyright notice, see the lib.rs file.
*/
//! **SNA** snapshot format utilities.
use std::io::{self, Read, Write, Seek, SeekFrom};

use log::{debug, warn};

use zxstate_core::{
    arch::Architecture,
    chip::MemCtrlFlags,
    cpu::{RegisterBank, interrupt_mode_from_bits, interrupt_mode_to_u8},
    memory::{PAGE_SIZE, RAM_BANKS},
    video::BorderColor
};

use crate::{StructRead, StructWrite, SnapshotError, Result};
use super::snapshot::*;
/*
   Offset   Size   Description
   ------------------------------------------------------------------------
   0        1      byte   I
   1        8      word   HL', DE', BC', AF'
   9        10     word   HL, DE, BC, IY, IX
   19       1      byte   Interrupt (bit 2 = IFF2)
   20       1      byte   R
   21       2      word   AF
   23       2      word   SP
   25       1      byte   IntMode (0=IM0|1=IM1|2=IM2)
   26       1      byte   BorderColor (0..=7)
   27       49152  bytes  RAM 16384..=65535
   ------------------------------------------------------------------------
   Size: 49179 bytes

   Offset   Size   Description
   ------------------------------------------------------------------------
   0        27     bytes  SNA header (see above)
   27       16Kb   bytes  RAM bank 5
   16411    16Kb   bytes  RAM bank 2
   32795    16Kb   bytes  RAM bank n / (currently paged bank)
   49179    2      word   PC
   49181    1      byte   port OUT 0x7ffd
   49182    1      byte   reserved (0)
   49183    16Kb   bytes  remaining RAM banks in ascending order
   ...
   ------------------------------------------------------------------------
   Size: 131103 bytes
*/
#[derive(Clone, Copy, Debug, Default)]
#[repr(C)]
#[repr(packed)]
struct SnaHeader {
    i: u8,
    hl_alt: [u8;2],
    de_alt: [u8;2],
    bc_alt: [u8;2],
    af_alt: [u8;2],
    hl: [u8;2],
    de: [u8;2],
    bc: [u8;2],
    iy: [u8;2],
    ix: [u8;2],
    iffs: u8,
    r: u8,
    af: [u8;2],
    sp: [u8;2],
    im: u8,
    border: u8
}

#[derive(Clone, Copy, Debug, Default)]
#[repr(C)]
#[repr(packed)]
struct SnaHeader128 {
    pc: [u8;2],
    port_data: u8,
    reserved: u8
}

// Structs must be packed and consist of `u8` or/and arrays of `u8` primitives only.
unsafe impl StructRead for SnaHeader {}
unsafe impl StructRead for SnaHeader128 {}
unsafe impl StructWrite for SnaHeader {}
unsafe impl StructWrite for SnaHeader128 {}

/// The length in bytes of the 48k **SNA** file.
pub const SNA48_LENGTH: u64 = 49179;
/// The length in bytes of the 128k **SNA** file.
pub const SNA128_LENGTH: u64 = 131103;

const IFF2_MASK: u8 = 0b0000_0100;
/// RAM banks stored first, the last one is replaced with the bank paged at `0xC000`.
const INDEX48: [usize;3] = [5, 2, 0];

/// How memory banks are written by [save_sna].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveMode {
    /// Each memory bank is written with a single bulk write.
    Block,
    /// Each byte is written separately and checked to be accepted.
    Byte
}

/// Returns the size of the **SNA** file for the given architecture.
pub fn sna_length(arch: Architecture) -> u64 {
    match arch {
        Architecture::Spectrum48 => SNA48_LENGTH,
        Architecture::Spectrum128 => SNA128_LENGTH
    }
}

fn read_header<R: Read, C: RegisterBank>(rd: R, cpu: &mut C) -> Result<BorderColor> {
    let sna = SnaHeader::read_new_struct(rd)?;
    cpu.set_interrupt_vector(sna.i);
    cpu.set_hl_alt(u16::from_le_bytes(sna.hl_alt));
    cpu.set_de_alt(u16::from_le_bytes(sna.de_alt));
    cpu.set_bc_alt(u16::from_le_bytes(sna.bc_alt));
    cpu.set_af_alt(u16::from_le_bytes(sna.af_alt));
    cpu.set_hl(u16::from_le_bytes(sna.hl));
    cpu.set_de(u16::from_le_bytes(sna.de));
    cpu.set_bc(u16::from_le_bytes(sna.bc));
    cpu.set_iy(u16::from_le_bytes(sna.iy));
    cpu.set_ix(u16::from_le_bytes(sna.ix));
    let iff = sna.iffs & IFF2_MASK != 0;
    cpu.set_interrupt_flip_flops(iff, iff);
    cpu.set_refresh(sna.r);
    cpu.set_af(u16::from_le_bytes(sna.af));
    cpu.set_stack_pointer(u16::from_le_bytes(sna.sp));
    if sna.im > 2 {
        warn!("SNA: invalid interrupt mode {} loaded as mode {}", sna.im, (sna.im & 3).min(2));
    }
    cpu.set_interrupt_mode(interrupt_mode_from_bits(sna.im));
    Ok(BorderColor::from_data(sna.border))
}

/// Loads an **SNA** file from `rd` into the provided `loader` implementing [SnapshotLoader].
///
/// The format variant is detected from the number of bytes between the current position of `rd`
/// and its end: exactly [SNA48_LENGTH] bytes is a 48k snapshot, anything longer is treated as
/// a 128k snapshot.
///
/// Returns the architecture of the loaded snapshot.
///
/// # Errors
/// [SnapshotError::Size] if the file is too short or [SnapshotError::Io] on a read error.
/// The CPU registers and the paging latches are reset before the size is checked.
/// An interrupt mode byte above 2 is not an error, only its low 2 bits are used and 3 is read
/// as mode 2.
pub fn load_sna<R: Read + Seek, L: SnapshotLoader>(
        mut rd: R,
        loader: &mut L
    ) -> Result<Architecture>
{
    reset_for_load(loader);

    let start = rd.seek(SeekFrom::Current(0))?;
    let end = rd.seek(SeekFrom::End(0))?;
    rd.seek(SeekFrom::Start(start))?;
    let size = end.saturating_sub(start);
    if size < SNA48_LENGTH {
        return Err(SnapshotError::Size { min: SNA48_LENGTH, found: size })
    }
    if size != SNA48_LENGTH && size < SNA128_LENGTH {
        return Err(SnapshotError::Size { min: SNA128_LENGTH, found: size })
    }

    let border = read_header(rd.by_ref(), loader.cpu_mut())?;
    loader.set_border_color(border);

    for &bank in INDEX48.iter() {
        rd.read_exact(loader.memory_mut().ram_bank_mut(bank)?)?;
    }

    let arch = if size == SNA48_LENGTH {
        debug!("SNA: 48k snapshot");
        let sp = loader.cpu_mut().stack_pointer();
        let pc = loader.memory_mut().read_word(sp);
        let cpu = loader.cpu_mut();
        cpu.set_program_counter(pc);
        cpu.set_stack_pointer(sp.wrapping_add(2));
        Architecture::Spectrum48
    }
    else {
        let sna_ext = SnaHeader128::read_new_struct(rd.by_ref())?;
        loader.cpu_mut().set_program_counter(u16::from_le_bytes(sna_ext.pc));
        let flags = MemCtrlFlags::from_data(sna_ext.port_data);
        let last_bank = flags.last_ram_page_bank();
        debug!("SNA: 128k snapshot, port: {:?}, last bank: {}", flags, last_bank);
        let mem = loader.memory_mut();
        mem.copy_ram_bank(INDEX48[2], last_bank)?;
        for bank in (0..RAM_BANKS).filter(|&n| n != 5 && n != 2 && n != last_bank) {
            rd.read_exact(mem.ram_bank_mut(bank)?)?;
        }
        mem.restore_mem_ctrl(flags);
        Architecture::Spectrum128
    };

    reconcile_architecture(loader, arch);
    Ok(arch)
}

fn make_header<C: RegisterBank>(cpu: &C) -> SnaHeader {
    let mut sna = SnaHeader::default();
    sna.i = cpu.interrupt_vector();
    sna.hl_alt = cpu.hl_alt().to_le_bytes();
    sna.de_alt = cpu.de_alt().to_le_bytes();
    sna.bc_alt = cpu.bc_alt().to_le_bytes();
    sna.af_alt = cpu.af_alt().to_le_bytes();
    sna.hl = cpu.hl().to_le_bytes();
    sna.de = cpu.de().to_le_bytes();
    sna.bc = cpu.bc().to_le_bytes();
    sna.iy = cpu.iy().to_le_bytes();
    sna.ix = cpu.ix().to_le_bytes();
    sna.iffs = if cpu.iff2() { IFF2_MASK } else { 0 };
    sna.r = cpu.refresh();
    sna.af = cpu.af().to_le_bytes();
    sna.sp = cpu.stack_pointer().to_le_bytes();
    sna.im = interrupt_mode_to_u8(cpu.interrupt_mode());
    sna
}

fn write_data<W: Write>(mut wr: W, data: &[u8], mode: SaveMode) -> io::Result<()> {
    match mode {
        SaveMode::Block => wr.write_all(data),
        SaveMode::Byte => {
            for byte in data.iter() {
                loop {
                    match wr.write(core::slice::from_ref(byte)) {
                        Ok(1) => break,
                        Ok(_) => return Err(io::Error::new(io::ErrorKind::WriteZero,
                                                "SNA: failed to write a byte")),
                        Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                        Err(e) => return Err(e)
                    }
                }
            }
            Ok(())
        }
    }
}

/// Saves an **SNA** file from the provided `snapshot` instance into `wr`.
///
/// For the 48k architecture the program counter is pushed onto the emulated stack and the stored
/// stack pointer is decremented by 2. The stack pointer of the CPU is left unchanged.
///
/// # Errors
/// [SnapshotError::Io] if `wr` fails or doesn't accept all the data.
pub fn save_sna<C: SnapshotCreator, W: Write>(
        snapshot: &mut C,
        mut wr: W,
        mode: SaveMode
    ) -> Result<()>
{
    let arch = snapshot.architecture();
    let mut sna = make_header(snapshot.cpu());
    sna.border = snapshot.border_color().into();
    let pc = snapshot.cpu().program_counter();

    if !arch.is_128k() {
        let sp = snapshot.cpu().stack_pointer().wrapping_sub(2);
        snapshot.memory_mut().write_word(sp, pc);
        sna.sp = sp.to_le_bytes();
    }

    write_data(wr.by_ref(), sna.as_bytes(), mode)?;

    let mem = snapshot.memory_ref();
    let last_bank = usize::from(mem.bank_latch());
    let index48 = [INDEX48[0], INDEX48[1], last_bank];
    for &bank in index48.iter() {
        write_data(wr.by_ref(), mem.ram_bank_ref(bank)?, mode)?;
    }

    if arch.is_128k() {
        let sna_ext = SnaHeader128 {
            pc: pc.to_le_bytes(),
            port_data: mem.mem_ctrl_flags().bits(),
            reserved: 0
        };
        write_data(wr.by_ref(), sna_ext.as_bytes(), mode)?;
        for bank in (0..RAM_BANKS).filter(|n| !index48.contains(n)) {
            write_data(wr.by_ref(), mem.ram_bank_ref(bank)?, mode)?;
        }
    }

    wr.flush()?;
    Ok(())
}

/// Saves an **SNA** file with [SaveMode::Block], retrying with [SaveMode::Byte] on failure.
///
/// Before retrying `wr` is rewound to the position it had when this function was called.
pub fn save_sna_with_fallback<C: SnapshotCreator, W: Write + Seek>(
        snapshot: &mut C,
        mut wr: W
    ) -> Result<()>
{
    let start = wr.seek(SeekFrom::Current(0))?;
    match save_sna(snapshot, wr.by_ref(), SaveMode::Block) {
        Err(SnapshotError::Io(err)) => {
            warn!("SNA: block write failed: {}, retrying byte by byte", err);
            wr.seek(SeekFrom::Start(start))?;
            save_sna(snapshot, wr, SaveMode::Byte)
        }
        res => res
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use rand::prelude::*;
    use zxstate_core::cpu::{InterruptMode, interrupt_mode_from_u8};
    use super::*;
    use crate::snapshot::tests::TestMachine;

    const PAGE: usize = PAGE_SIZE;

    fn random_machine(arch: Architecture, rng: &mut SmallRng) -> TestMachine {
        let mut machine = TestMachine::new(arch);
        machine.mem.fill_ram(|| rng.gen());
        let cpu = &mut machine.cpu;
        cpu.set_af(rng.gen());
        cpu.set_bc(rng.gen());
        cpu.set_de(rng.gen());
        cpu.set_hl(rng.gen());
        cpu.set_af_alt(rng.gen());
        cpu.set_bc_alt(rng.gen());
        cpu.set_de_alt(rng.gen());
        cpu.set_hl_alt(rng.gen());
        cpu.set_ix(rng.gen());
        cpu.set_iy(rng.gen());
        cpu.set_stack_pointer(rng.gen_range(0x4002..=0xFFFF));
        cpu.set_program_counter(rng.gen());
        cpu.set_interrupt_vector(rng.gen());
        cpu.set_refresh(rng.gen());
        cpu.set_interrupt_mode(interrupt_mode_from_u8(rng.gen_range(0..3)).unwrap());
        let iff = rng.gen();
        cpu.set_interrupt_flip_flops(iff, iff);
        machine.border = BorderColor::from_data(rng.gen());
        if arch.is_128k() {
            machine.mem.restore_mem_ctrl(MemCtrlFlags::from_data(rng.gen()));
        }
        machine
    }

    fn assert_cpu_eq<C: RegisterBank>(a: &C, b: &C) {
        assert_eq!(a.af(), b.af());
        assert_eq!(a.bc(), b.bc());
        assert_eq!(a.de(), b.de());
        assert_eq!(a.hl(), b.hl());
        assert_eq!(a.af_alt(), b.af_alt());
        assert_eq!(a.bc_alt(), b.bc_alt());
        assert_eq!(a.de_alt(), b.de_alt());
        assert_eq!(a.hl_alt(), b.hl_alt());
        assert_eq!(a.ix(), b.ix());
        assert_eq!(a.iy(), b.iy());
        assert_eq!(a.stack_pointer(), b.stack_pointer());
        assert_eq!(a.program_counter(), b.program_counter());
        assert_eq!(a.interrupt_vector(), b.interrupt_vector());
        assert_eq!(a.refresh(), b.refresh());
        assert_eq!(a.interrupt_mode(), b.interrupt_mode());
        assert_eq!(a.iff1(), b.iff1());
        assert_eq!(a.iff2(), b.iff2());
    }

    fn assert_ram_eq(a: &TestMachine, b: &TestMachine) {
        for bank in 0..RAM_BANKS {
            assert_eq!(&a.mem.ram_bank_ref(bank).unwrap()[..], &b.mem.ram_bank_ref(bank).unwrap()[..],
                       "RAM bank {}", bank);
        }
    }

    #[test]
    fn sna_round_trip_works() {
        let mut rng = SmallRng::seed_from_u64(7);
        for &arch in &[Architecture::Spectrum48, Architecture::Spectrum128] {
            for _ in 0..4 {
                let mut machine = random_machine(arch, &mut rng);
                let mut cursor = Cursor::new(Vec::new());
                save_sna(&mut machine, &mut cursor, SaveMode::Block).unwrap();
                assert_eq!(cursor.get_ref().len() as u64, sna_length(arch));
                let mut loaded = TestMachine::new(arch);
                cursor.set_position(0);
                assert_eq!(load_sna(&mut cursor, &mut loaded).unwrap(), arch);
                assert_cpu_eq(&machine.cpu, &loaded.cpu);
                assert_eq!(machine.border, loaded.border);
                if arch.is_128k() {
                    assert_ram_eq(&machine, &loaded);
                    assert_eq!(machine.mem.latches(), loaded.mem.latches());
                }
                else {
                    for bank in INDEX48.iter().copied() {
                        assert_eq!(&machine.mem.ram_bank_ref(bank).unwrap()[..],
                                   &loaded.mem.ram_bank_ref(bank).unwrap()[..]);
                    }
                }
            }
        }
    }

    #[test]
    fn sna_save_modes_are_equivalent() {
        let mut rng = SmallRng::seed_from_u64(3);
        for &arch in &[Architecture::Spectrum48, Architecture::Spectrum128] {
            let machine = random_machine(arch, &mut rng);
            let mut block = Vec::new();
            save_sna(&mut machine.clone(), &mut block, SaveMode::Block).unwrap();
            let mut bytes = Vec::new();
            save_sna(&mut machine.clone(), &mut bytes, SaveMode::Byte).unwrap();
            assert_eq!(block, bytes);
        }
    }

    #[test]
    fn sna_48k_layout_works() {
        let mut machine = TestMachine::new(Architecture::Spectrum48);
        machine.cpu.set_stack_pointer(0x8000);
        machine.cpu.set_program_counter(0x1234);
        machine.cpu.set_af(0xABCD);
        machine.cpu.set_af_alt(0x0102);
        machine.cpu.set_interrupt_flip_flops(true, true);
        machine.cpu.set_interrupt_mode(InterruptMode::Mode1);
        machine.border = BorderColor::RED;
        let mut data = Vec::new();
        save_sna(&mut machine, &mut data, SaveMode::Block).unwrap();
        assert_eq!(machine.cpu.stack_pointer(), 0x8000);
        assert_eq!(machine.mem.read_word(0x7FFE), 0x1234);
        assert_eq!(&data[7..9], &[0x02, 0x01]);
        assert_eq!(data[19], 0x04);
        assert_eq!(&data[21..23], &[0xCD, 0xAB]);
        assert_eq!(&data[23..25], &[0xFE, 0x7F]);
        assert_eq!(data[25], 1);
        assert_eq!(data[26], 2);
        assert_eq!(&data[27 + PAGE - 2..27 + PAGE], &[0x34, 0x12]);
    }

    #[test]
    fn sna_128k_layout_works() {
        let mut machine = TestMachine::new(Architecture::Spectrum128);
        for bank in 0..RAM_BANKS {
            machine.mem.ram_bank_mut(bank).unwrap().fill(bank as u8);
        }
        machine.mem.restore_mem_ctrl(MemCtrlFlags::from_data(0b01_1110));
        machine.cpu.set_program_counter(0xBEEF);
        let mut data = Vec::new();
        save_sna(&mut machine, &mut data, SaveMode::Block).unwrap();
        assert_eq!(data.len() as u64, SNA128_LENGTH);
        let page_at = |n: usize| data[27 + n * PAGE];
        assert_eq!(page_at(0), 5);
        assert_eq!(page_at(1), 2);
        assert_eq!(page_at(2), 6);
        let ext = 27 + 3 * PAGE;
        assert_eq!(&data[ext..ext + 4], &[0xEF, 0xBE, 0b01_1110, 0]);
        let rest: Vec<u8> = (0..5).map(|n| data[ext + 4 + n * PAGE]).collect();
        assert_eq!(rest, vec![0, 1, 3, 4, 7]);
    }

    #[test]
    fn sna_load_errors_work() {
        let mut machine = TestMachine::new(Architecture::Spectrum48);
        machine.mem.restore_mem_ctrl(MemCtrlFlags::from_data(3));
        machine.cpu.set_program_counter(0x4444);
        let err = load_sna(Cursor::new(vec![0u8; 100]), &mut machine).unwrap_err();
        match err {
            SnapshotError::Size { min, found } => {
                assert_eq!(min, SNA48_LENGTH);
                assert_eq!(found, 100);
            }
            e => panic!("unexpected error: {}", e)
        }
        assert_eq!(machine.cpu.program_counter(), 0);
        assert_eq!(machine.mem.bank_latch(), 0);
        assert!(machine.mem.is_paging_locked());

        let err = load_sna(Cursor::new(vec![0u8; SNA48_LENGTH as usize + 1]), &mut machine).unwrap_err();
        assert!(matches!(err, SnapshotError::Size { min: SNA128_LENGTH, .. }));

    }

    #[test]
    fn sna_load_invalid_interrupt_mode() {
        let mut machine = TestMachine::new(Architecture::Spectrum48);
        let mut data = vec![0u8; SNA48_LENGTH as usize];
        data[25] = 3;
        assert_eq!(load_sna(Cursor::new(&data), &mut machine).unwrap(), Architecture::Spectrum48);
        assert_eq!(machine.cpu.interrupt_mode(), InterruptMode::Mode2);
        data[25] = 1;
        load_sna(Cursor::new(&data), &mut machine).unwrap();
        assert_eq!(machine.cpu.interrupt_mode(), InterruptMode::Mode1);
    }

    #[test]
    fn sna_load_from_offset_works() {
        let mut machine = TestMachine::new(Architecture::Spectrum48);
        machine.cpu.set_stack_pointer(0xC000);
        machine.cpu.set_program_counter(0x8765);
        let mut data = vec![0xAA; 10];
        save_sna(&mut machine, &mut data, SaveMode::Block).unwrap();
        let mut cursor = Cursor::new(data);
        cursor.set_position(10);
        let mut loaded = TestMachine::new(Architecture::Spectrum48);
        assert_eq!(load_sna(cursor, &mut loaded).unwrap(), Architecture::Spectrum48);
        assert_eq!(loaded.cpu.program_counter(), 0x8765);
        assert_eq!(loaded.cpu.stack_pointer(), 0xC000);
    }

    #[test]
    fn sna_load_reconciles_architecture() {
        let mut machine48 = TestMachine::new(Architecture::Spectrum48);
        let mut sna48 = Vec::new();
        save_sna(&mut machine48, &mut sna48, SaveMode::Block).unwrap();
        let mut machine128 = TestMachine::new(Architecture::Spectrum128);
        let mut sna128 = Vec::new();
        save_sna(&mut machine128, &mut sna128, SaveMode::Block).unwrap();

        let mut loader = TestMachine::new(Architecture::Spectrum128);
        load_sna(Cursor::new(&sna48), &mut loader).unwrap();
        assert_eq!(loader.arch, Architecture::Spectrum128);
        assert_eq!(loader.mem.rom_in_use(), 1);

        loader.force = true;
        load_sna(Cursor::new(&sna48), &mut loader).unwrap();
        assert_eq!(loader.arch, Architecture::Spectrum48);
        assert_eq!(loader.mem.rom_in_use(), 0);

        load_sna(Cursor::new(&sna128), &mut loader).unwrap();
        assert_eq!(loader.arch, Architecture::Spectrum128);
        assert_eq!(loader.mem.rom_in_use(), 1);
    }

    /// A sink accepting only a limited number of bytes per write call and failing bulk writes.
    struct Picky {
        inner: Cursor<Vec<u8>>,
        max_write: usize
    }

    impl Write for Picky {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if buf.len() > self.max_write {
                return Err(io::Error::new(io::ErrorKind::Other, "write too large"))
            }
            self.inner.write(buf)
        }
        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    impl Seek for Picky {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    /// A sink that stops accepting data after a limit.
    struct Full(usize);

    impl Write for Full {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len().min(self.0);
            self.0 -= n;
            Ok(n)
        }
        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    impl Seek for Full {
        fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> { Ok(0) }
    }

    #[test]
    fn sna_save_fallback_works() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut machine = random_machine(Architecture::Spectrum128, &mut rng);
        let mut expected = Vec::new();
        save_sna(&mut machine.clone(), &mut expected, SaveMode::Block).unwrap();
        let mut picky = Picky { inner: Cursor::new(Vec::new()), max_write: 1 };
        save_sna_with_fallback(&mut machine, &mut picky).unwrap();
        assert_eq!(picky.inner.into_inner(), expected);
    }

    #[test]
    fn sna_save_short_write_fails() {
        let mut machine = TestMachine::new(Architecture::Spectrum128);
        let err = save_sna(&mut machine, Full(1000), SaveMode::Block).unwrap_err();
        assert!(err.is_io());
        let err = save_sna(&mut machine, Full(1000), SaveMode::Byte).unwrap_err();
        match err {
            SnapshotError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::WriteZero),
            e => panic!("unexpected error: {}", e)
        }
        let err = save_sna_with_fallback(&mut machine, Full(SNA128_LENGTH as usize - 1)).unwrap_err();
        assert!(err.is_io());
    }
}
