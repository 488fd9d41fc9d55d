#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use quickcheck_macros::quickcheck;
    use std::io::Cursor;
    use ts_pmt::config::CodecConfig;
    use ts_pmt::format::ts::{
        decode_pmt, encode_pmt, read_pmt, write_pmt, Descriptor, LogObserver, Pmt, PmtCodec, StreamEntry,
        DEFAULT_PMT_PACKET, DEFAULT_PMT_SECTION, STREAM_TYPE_AAC, STREAM_TYPE_H264,
    };
    use ts_pmt::PsiError;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn descriptors(raw: Vec<(u8, Vec<u8>)>, max: usize) -> Vec<Descriptor> {
        raw.into_iter()
            .take(max)
            .map(|(tag, mut data)| {
                data.truncate(64);
                Descriptor::new(tag, data)
            })
            .collect()
    }

    #[quickcheck]
    fn prop_pmt_round_trip(
        header: (u16, u8, bool, u8, u8),
        pcr_pid: u16,
        program_info: Vec<(u8, Vec<u8>)>,
        streams: Vec<(u8, u16, Vec<(u8, Vec<u8>)>)>,
    ) -> bool {
        let (program_number, version_number, current_next_indicator, section_number, last_section_number) = header;
        let mut pmt = Pmt::new(program_number, pcr_pid);
        pmt.version_number = version_number;
        pmt.current_next_indicator = current_next_indicator;
        pmt.section_number = section_number;
        pmt.last_section_number = last_section_number;
        pmt.program_descriptors = descriptors(program_info, 4);
        pmt.streams = streams
            .into_iter()
            .take(8)
            .map(|(stream_type, pid, descs)| StreamEntry {
                stream_type,
                elementary_pid: pid,
                descriptors: descriptors(descs, 4),
            })
            .collect();

        let section = match encode_pmt(&pmt) {
            Ok(section) => section,
            Err(_) => return false,
        };
        let decoded = match decode_pmt(&section) {
            Ok(decoded) => decoded,
            Err(_) => return false,
        };

        let mut expected = pmt;
        expected.version_number &= 0x1f;
        expected.pcr_pid &= 0x1fff;
        for stream in &mut expected.streams {
            stream.elementary_pid &= 0x1fff;
        }
        expected.section_length = section.len() as u16 - 3;
        expected.crc32 = u32::from_be_bytes([
            section[section.len() - 4],
            section[section.len() - 3],
            section[section.len() - 2],
            section[section.len() - 1],
        ]);
        decoded == expected
    }

    #[quickcheck]
    fn prop_truncated_section_is_rejected(cut: usize) -> bool {
        let cut = cut % DEFAULT_PMT_SECTION.len();
        matches!(
            decode_pmt(&DEFAULT_PMT_SECTION[..cut]),
            Err(PsiError::TruncatedSection { .. })
        )
    }

    #[test]
    fn test_sequential_sections() {
        init_logger();
        let first = Pmt::new(1, 0x100).with_stream(StreamEntry::new(STREAM_TYPE_H264, 0x100));
        let second = Pmt::new(2, 0x200).with_stream(StreamEntry::new(STREAM_TYPE_AAC, 0x201));

        let mut out = Vec::new();
        let n = write_pmt(&mut out, &first).unwrap();
        assert_eq!(n, out.len());
        write_pmt(&mut out, &second).unwrap();

        let mut cursor = Cursor::new(out);
        assert_eq!(read_pmt(&mut cursor).unwrap().program_number, 1);
        assert_eq!(read_pmt(&mut cursor).unwrap().program_number, 2);
        assert_matches!(
            read_pmt(&mut cursor),
            Err(PsiError::TruncatedSection {
                field: "section_header",
                ..
            })
        );
    }

    #[test]
    fn test_descriptor_boundaries() {
        for len in [0, 255] {
            let pmt = Pmt::new(1, 0x100)
                .with_stream(StreamEntry::new(STREAM_TYPE_H264, 0x100).with_descriptor(Descriptor::new(0x80, vec![0xa5; len])));
            let decoded = decode_pmt(&encode_pmt(&pmt).unwrap()).unwrap();
            assert_eq!(decoded.streams[0].descriptors[0].data.len(), len);
        }

        let pmt = Pmt::new(1, 0x100)
            .with_stream(StreamEntry::new(STREAM_TYPE_H264, 0x100).with_descriptor(Descriptor::new(0x80, vec![0xa5; 256])));
        assert_matches!(encode_pmt(&pmt), Err(PsiError::OversizeDescriptor { length: 256, .. }));
    }

    #[test]
    fn test_codec_from_config_file() {
        init_logger();
        let path = std::env::temp_dir().join(format!("ts-pmt-{}.conf", std::process::id()));
        std::fs::write(&path, "unit_size = 188\nstuffing_byte = 0xff\nevent_level = info\n").unwrap();
        let config = CodecConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.event_level, log::Level::Info);

        let level = config.event_level;
        let mut codec = PmtCodec::new(config).with_observer(LogObserver::new(level));
        let pmt = codec.decode(&DEFAULT_PMT_SECTION[..]).unwrap();

        let mut packet = Vec::new();
        codec
            .write_packet(&mut packet, &DEFAULT_PMT_PACKET[..4], &pmt)
            .unwrap();
        assert_eq!(&packet[..], &DEFAULT_PMT_PACKET[..]);
    }
}
